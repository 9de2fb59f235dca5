use crate::errors::{DomainError, DomainResult};
use crate::validation::common::{DATETIME_FORMAT, DATE_FORMAT};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

/// Trait for finding entities by ID
#[async_trait]
pub trait FindById<T> {
    /// Find an entity by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<T>;
}

/// Trait for entities that support hard deletion
#[async_trait]
pub trait HardDeletable {
    /// Hard delete an entity by ID (standalone)
    async fn hard_delete(&self, id: Uuid) -> DomainResult<()>;

    /// Hard delete an entity by ID within a transaction
    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()>;
}

// Column decoding shared by the `*Row::into_entity` conversions.

pub fn parse_uuid(value: &str, column: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        DomainError::Internal(format!("Invalid UUID format '{}' in {}: {}", value, column, e))
    })
}

pub fn parse_optional_uuid(value: Option<&str>, column: &str) -> DomainResult<Option<Uuid>> {
    value.map(|v| parse_uuid(v, column)).transpose()
}

pub fn parse_timestamp(value: &str, column: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            DomainError::Internal(format!("Invalid RFC3339 format '{}' in {}: {}", value, column, e))
        })
}

pub fn parse_date(value: &str, column: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        DomainError::Internal(format!("Invalid date '{}' in {}: {}", value, column, e))
    })
}

pub fn parse_optional_date(value: Option<&str>, column: &str) -> DomainResult<Option<NaiveDate>> {
    value.map(|v| parse_date(v, column)).transpose()
}

pub fn parse_datetime(value: &str, column: &str) -> DomainResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).map_err(|e| {
        DomainError::Internal(format!("Invalid date-time '{}' in {}: {}", value, column, e))
    })
}

/// Store encoding of a date-only value.
pub fn date_to_db(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Store encoding of a naive UTC date-time.
pub fn datetime_to_db(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Commit on success, roll back on failure.
pub async fn finish_tx<T>(
    tx: Transaction<'_, Sqlite>,
    result: DomainResult<T>,
) -> DomainResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(crate::errors::DbError::from)?;
            Ok(value)
        }
        Err(e) => {
            let _ = tx.rollback().await; // Ignore rollback error
            Err(e)
        }
    }
}
