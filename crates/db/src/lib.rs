//! Local persistence for the clip library and user settings.
//!
//! Backed by a single SQLite file (or an in-memory database in tests).

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

mod error;
pub mod models;
pub mod repositories;

pub use error::StoreError;

pub type DbPool = sqlx::SqlitePool;

/// Connection cap for file-backed databases.
const MAX_CONNECTIONS: u32 = 4;

/// Seconds to wait on a locked database before failing a statement.
const BUSY_TIMEOUT_SECS: u64 = 5;

/// Open (creating if missing) the database at `database_url`.
///
/// In-memory URLs get a single, never-recycled connection so every caller
/// sees the same database.
pub async fn create_pool(database_url: &str) -> Result<DbPool, StoreError> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(StoreError::Unavailable)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
    };

    pool_options
        .connect_with(options)
        .await
        .map_err(StoreError::Unavailable)
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(StoreError::Unavailable)?;
    Ok(())
}

/// Apply the embedded migrations under `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), StoreError> {
    sqlx::migrate!("../../db/migrations").run(pool).await?;
    Ok(())
}
