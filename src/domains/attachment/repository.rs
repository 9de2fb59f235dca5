use crate::domains::attachment::types::{Attachment, AttachmentRow, NewAttachment};
use crate::domains::core::repository::FindById;
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, SqlitePool};
use uuid::Uuid;

/// Trait defining attachment repository operations
#[async_trait]
pub trait AttachmentRepository: FindById<Attachment> + Send + Sync {
    async fn create(&self, new_attachment: &NewAttachment) -> DomainResult<Attachment>;

    /// Ids from `ids` that do not belong to any attachment.
    async fn find_missing_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Uuid>>;
}

/// SQLite implementation for AttachmentRepository
#[derive(Debug, Clone)]
pub struct SqliteAttachmentRepository {
    pool: SqlitePool,
}

impl SqliteAttachmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FindById<Attachment> for SqliteAttachmentRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Attachment> {
        let row = query_as::<_, AttachmentRow>("SELECT * FROM attachments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Attachment".to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl AttachmentRepository for SqliteAttachmentRepository {
    async fn create(&self, new_attachment: &NewAttachment) -> DomainResult<Attachment> {
        let id = Uuid::new_v4();

        query("INSERT INTO attachments (id, name, mime_type, uri, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(id.to_string())
            .bind(new_attachment.name.trim())
            .bind(&new_attachment.mime_type)
            .bind(&new_attachment.uri)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        self.find_by_id(id).await
    }

    async fn find_missing_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Uuid>> {
        let mut missing = Vec::new();
        for id in ids {
            let exists: bool = query_scalar("SELECT EXISTS(SELECT 1 FROM attachments WHERE id = ?)")
                .bind(id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            if !exists {
                missing.push(*id);
            }
        }
        Ok(missing)
    }
}
