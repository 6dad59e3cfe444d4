use anyhow::Result;
use diesel::prelude::*;
use log::{debug, info};

use crate::db::models::{NewUser, UpdateUser, User};
use crate::db::schema::{exercises, metric_definitions, users, workouts};

use super::is_empty_changeset;

pub fn create_user(conn: &mut SqliteConnection, new_user: &NewUser) -> Result<User> {
    debug!("Creating user {}", new_user.username);
    diesel::insert_into(users::table)
        .values(new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_user(conn: &mut SqliteConnection, user_id: i64) -> Result<Option<User>> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

pub fn get_user_by_email(conn: &mut SqliteConnection, email: &str) -> Result<Option<User>> {
    users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

pub fn get_user_by_google_id(conn: &mut SqliteConnection, google_id: &str) -> Result<Option<User>> {
    users::table
        .filter(users::google_id.eq(google_id))
        .select(User::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

pub fn list_users(conn: &mut SqliteConnection) -> Result<Vec<User>> {
    users::table
        .order(users::id.asc())
        .select(User::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn update_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    update: &UpdateUser,
) -> Result<Option<User>> {
    let updated = diesel::update(users::table.find(user_id))
        .set(update)
        .returning(User::as_returning())
        .get_result(conn)
        .optional();
    match updated {
        Err(e) if is_empty_changeset(&e) => get_user(conn, user_id),
        other => other.map_err(Into::into),
    }
}

/// Deletes a user and, through the foreign keys, every workout, exercise and
/// metric definition they own along with everything hanging off those.
/// Runs as one transaction. Returns the number of user rows removed.
pub fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> Result<usize> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let owned_workouts: i64 = workouts::table
            .filter(workouts::user_id.eq(user_id))
            .count()
            .get_result(conn)?;
        let owned_exercises: i64 = exercises::table
            .filter(exercises::user_id.eq(user_id))
            .count()
            .get_result(conn)?;
        let owned_metrics: i64 = metric_definitions::table
            .filter(metric_definitions::user_id.eq(user_id))
            .count()
            .get_result(conn)?;

        let deleted = diesel::delete(users::table.find(user_id)).execute(conn)?;
        if deleted > 0 {
            info!(
                "Deleted user {} with {} workouts, {} exercises, {} metric definitions",
                user_id, owned_workouts, owned_exercises, owned_metrics
            );
        }
        Ok(deleted)
    })
}
