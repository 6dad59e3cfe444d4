//! Persistence layer for the fitness tracker: schema, row types, a pooled
//! session factory and per-table data access.

pub mod db;
pub mod logging;

pub use db::{DbConfig, Session, SessionFactory};
