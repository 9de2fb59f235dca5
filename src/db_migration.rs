use crate::errors::{DbError, DbResult};
use log::{debug, info};
use sqlx::SqlitePool;

// Embed all migration SQL files at compile time
const MIGRATION_TRAINING_CORE: &str = include_str!("../migrations/20250601000000_training_core.sql");
const MIGRATION_CODE_SEQUENCES: &str = include_str!("../migrations/20250602000000_code_sequences.sql");

// List of migrations with their names and SQL content, in application order
const MIGRATIONS: &[(&str, &str)] = &[
    ("20250601000000_training_core.sql", MIGRATION_TRAINING_CORE),
    ("20250602000000_code_sequences.sql", MIGRATION_CODE_SEQUENCES),
];

/// Bring the schema up to date. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    create_migrations_table(pool).await?;

    let last_migration = get_last_migration(pool).await?;
    match &last_migration {
        Some(name) => debug!("Last applied migration: {}", name),
        None => debug!("No migrations applied yet"),
    }

    let pending = get_pending_migrations(last_migration.as_deref());
    if pending.is_empty() {
        debug!("No pending migrations to apply");
        return Ok(());
    }

    for (name, sql) in pending {
        apply_migration(pool, name, sql).await?;
        info!("Applied migration {}", name);
    }
    Ok(())
}

/// Create migrations table if it doesn't exist
async fn create_migrations_table(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| DbError::Migration(format!("Failed to create migrations table: {}", e)))?;

    Ok(())
}

/// Get the last applied migration
async fn get_last_migration(pool: &SqlitePool) -> DbResult<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT name FROM migrations ORDER BY id DESC LIMIT 1")
        .fetch_optional(pool)
        .await
        .map_err(|e| DbError::Migration(format!("Failed to get last migration: {}", e)))
}

/// Each migration and its bookkeeping row commit together.
async fn apply_migration(pool: &SqlitePool, name: &str, sql: &str) -> DbResult<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::Transaction(format!("Failed to begin migration {}: {}", name, e)))?;

    let result = async {
        sqlx::raw_sql(sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::Migration(format!("Failed to apply migration {}: {}", name, e)))?;

        sqlx::query("INSERT INTO migrations (name, applied_at) VALUES (?, ?)")
            .bind(name)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::Migration(format!("Failed to record migration {}: {}", name, e)))?;
        Ok::<(), DbError>(())
    }
    .await;

    match result {
        Ok(()) => tx
            .commit()
            .await
            .map_err(|e| DbError::Transaction(format!("Failed to commit migration {}: {}", name, e))),
        Err(e) => {
            let _ = tx.rollback().await;
            Err(e)
        }
    }
}

/// Migrations listed after the last applied one
fn get_pending_migrations(last_migration: Option<&str>) -> Vec<(&'static str, &'static str)> {
    let mut pending = Vec::new();
    let mut should_include = last_migration.is_none();

    for &(migration_name, migration_sql) in MIGRATIONS {
        if should_include {
            pending.push((migration_name, migration_sql));
        } else if Some(migration_name) == last_migration {
            should_include = true;
        }
    }

    pending
}
