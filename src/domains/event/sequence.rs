use crate::errors::{DbError, DomainResult};
use async_trait::async_trait;
use sqlx::{query_scalar, Sqlite, Transaction};

/// Source of unique event codes.
#[async_trait]
pub trait CodeSequence: Send + Sync {
    /// Reserve the next code inside the caller's transaction.
    async fn next_code_with_tx<'t>(&self, tx: &mut Transaction<'t, Sqlite>) -> DomainResult<String>;
}

/// Counter stored in `code_sequences`, one row per prefix.
#[derive(Debug, Clone)]
pub struct SqliteCodeSequence {
    prefix: String,
    padding: usize,
}

impl SqliteCodeSequence {
    pub fn new(prefix: impl Into<String>, padding: usize) -> Self {
        Self {
            prefix: prefix.into(),
            padding,
        }
    }

    pub fn format_code(&self, number: i64) -> String {
        format!("{}{:0width$}", self.prefix, number, width = self.padding)
    }
}

#[async_trait]
impl CodeSequence for SqliteCodeSequence {
    async fn next_code_with_tx<'t>(&self, tx: &mut Transaction<'t, Sqlite>) -> DomainResult<String> {
        let number: i64 = query_scalar(
            "INSERT INTO code_sequences (code, number_next) VALUES (?, 2)
             ON CONFLICT(code) DO UPDATE SET number_next = number_next + 1
             RETURNING number_next - 1",
        )
        .bind(&self.prefix)
        .fetch_one(&mut **tx)
        .await
        .map_err(DbError::from)?;

        Ok(self.format_code(number))
    }
}
