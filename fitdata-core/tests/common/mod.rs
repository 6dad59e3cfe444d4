#![allow(dead_code)]

use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;
use fitdata::db::models::{NewUser, User};
use fitdata::db::operations::create_user;
use fitdata::{DbConfig, SessionFactory};
use tempfile::TempDir;

/// A migrated, file-backed database that lives as long as the value.
pub struct TestDb {
    pub factory: SessionFactory,
    _dir: TempDir,
}

pub fn setup_test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = dir.path().join("fitdata.db").to_string_lossy().into_owned();
    let factory = SessionFactory::new(&DbConfig::new(url).with_pool_size(2))
        .expect("Failed to create session factory");
    factory.migrate().expect("Failed to run migrations");
    TestDb { factory, _dir: dir }
}

pub fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        goal: "strength".to_string(),
        ..Default::default()
    }
}

pub fn alice(conn: &mut SqliteConnection) -> User {
    create_user(conn, &new_user("alice", "a@x.com")).expect("Failed to create alice")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
