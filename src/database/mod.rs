//! Connection pool construction for the SQLite store.

use crate::config::Settings;
use crate::db_migration;
use crate::errors::{DbError, DbResult};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Writers wait this long for the database lock before failing with `DbError::Locked`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a pool with foreign keys enforced. In-memory URLs skip WAL.
pub async fn connect(settings: &Settings) -> DbResult<SqlitePool> {
    let mut options = SqliteConnectOptions::from_str(&settings.database_url)
        .map_err(|e| DbError::ConnectionPool(format!("Invalid database URL '{}': {}", settings.database_url, e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let in_memory = settings.database_url.contains(":memory:");
    let mut pool_options = SqlitePoolOptions::new().max_connections(settings.max_connections);
    if in_memory {
        // the database lives only as long as its connection
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    } else {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    pool_options
        .connect_with(options)
        .await
        .map_err(|e| DbError::ConnectionPool(e.to_string()))
}

/// Open a pool and apply pending migrations.
pub async fn connect_and_migrate(settings: &Settings) -> DbResult<SqlitePool> {
    let pool = connect(settings).await?;
    db_migration::run_migrations(&pool).await?;
    info!("Database ready at {}", settings.database_url);
    Ok(pool)
}
