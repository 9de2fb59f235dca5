use crate::domains::core::repository::{parse_timestamp, parse_uuid};
use crate::errors::DomainResult;
use crate::validation::{Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file reference that sessions can link to. Never owned by a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub mime_type: Option<String>,
    pub uri: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// NewAttachment DTO - used when registering an attachment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
    pub name: String,
    pub mime_type: Option<String>,
    pub uri: Option<String>,
}

impl Validate for NewAttachment {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(self.name.clone()))
            .not_blank()
            .max_length(255)
            .validate()?;

        if let Some(mime_type) = &self.mime_type {
            ValidationBuilder::new("mime_type", Some(mime_type.clone()))
                .max_length(127)
                .validate()?;
        }
        Ok(())
    }
}

/// AttachmentRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentRow {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub uri: Option<String>,
    pub created_at: String,
}

impl AttachmentRow {
    pub fn into_entity(self) -> DomainResult<Attachment> {
        Ok(Attachment {
            id: parse_uuid(&self.id, "attachments.id")?,
            name: self.name,
            mime_type: self.mime_type,
            uri: self.uri,
            created_at: parse_timestamp(&self.created_at, "attachments.created_at")?,
        })
    }
}
