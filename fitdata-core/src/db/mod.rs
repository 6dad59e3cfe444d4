pub mod embedding;
pub mod models;
pub mod operations;
pub mod schema;

use anyhow::Result;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, info, warn};
use std::env;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub const DEFAULT_POOL_SIZE: u32 = 4;

/// A pooled connection. Dropping it hands the connection back to the pool.
pub type Session = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_url: String,
    pub pool_size: u32,
}

impl DbConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Reads `DATABASE_URL` and the optional `FITDATA_POOL_SIZE`.
    /// Returns `None` when no database is configured.
    pub fn from_env() -> Option<Self> {
        let url = env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty())?;
        let mut config = Self::new(url);
        if let Ok(raw) = env::var("FITDATA_POOL_SIZE") {
            match raw.parse::<u32>() {
                Ok(size) => config = config.with_pool_size(size),
                Err(_) => warn!("Ignoring invalid FITDATA_POOL_SIZE: {}", raw),
            }
        }
        Some(config)
    }
}

#[derive(Debug)]
struct ConnectionPragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(
            "PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(r2d2::Error::QueryError)
    }
}

/// Hands out [`Session`]s against the configured database.
///
/// Only exists when a database is configured: the constructors return
/// `Ok(None)` rather than an error when there is nothing to connect to.
#[derive(Clone)]
pub struct SessionFactory {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl SessionFactory {
    pub fn new(config: &DbConfig) -> Result<Self> {
        debug!(
            "Building connection pool for {} (max {} connections)",
            config.database_url, config.pool_size
        );
        let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)
            .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;
        Ok(Self { pool })
    }

    pub fn from_config(config: Option<&DbConfig>) -> Result<Option<Self>> {
        match config {
            Some(config) => Self::new(config).map(Some),
            None => {
                debug!("No database configured, session factory not created");
                Ok(None)
            }
        }
    }

    pub fn from_env() -> Result<Option<Self>> {
        Self::from_config(DbConfig::from_env().as_ref())
    }

    pub fn open_session(&self) -> Result<Session> {
        self.pool.get().map_err(Into::into)
    }

    /// Opens a session, runs `f` against it and releases the session on
    /// every path out of `f`.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut SqliteConnection) -> Result<T>) -> Result<T> {
        let mut session = self.open_session()?;
        f(&mut *session)
    }

    pub fn migrate(&self) -> Result<()> {
        self.with_session(run_migrations)
    }
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    if applied.is_empty() {
        debug!("Schema up to date, no migrations applied");
    }
    for version in applied {
        info!("Applied migration {}", version);
    }
    Ok(())
}

/// Classifies a constraint violation raised by the database, if that is
/// what `err` is.
pub fn constraint_violation(err: &anyhow::Error) -> Option<DatabaseErrorKind> {
    match err.downcast_ref::<DieselError>() {
        Some(DieselError::DatabaseError(kind, _)) => Some(*kind),
        _ => None,
    }
}
