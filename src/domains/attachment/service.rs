use crate::auth::AuthContext;
use crate::domains::attachment::repository::AttachmentRepository;
use crate::domains::attachment::types::{Attachment, NewAttachment};
use crate::errors::{ServiceError, ServiceResult};
use crate::types::Permission;
use crate::validation::Validate;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining session attachment operations
#[async_trait]
pub trait AttachmentService: Send + Sync {
    /// Registering an attachment is part of editing sessions.
    async fn create_attachment(
        &self,
        new_attachment: NewAttachment,
        auth: &AuthContext,
    ) -> ServiceResult<Attachment>;

    async fn get_attachment(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Attachment>;
}

#[derive(Clone)]
pub struct AttachmentServiceImpl {
    repo: Arc<dyn AttachmentRepository>,
}

impl AttachmentServiceImpl {
    pub fn new(repo: Arc<dyn AttachmentRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AttachmentService for AttachmentServiceImpl {
    async fn create_attachment(
        &self,
        new_attachment: NewAttachment,
        auth: &AuthContext,
    ) -> ServiceResult<Attachment> {
        auth.authorize(Permission::EditSessions)?;
        new_attachment.validate()?;
        self.repo.create(&new_attachment).await.map_err(ServiceError::Domain)
    }

    async fn get_attachment(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Attachment> {
        auth.authorize(Permission::ViewSessions)?;
        self.repo.find_by_id(id).await.map_err(ServiceError::Domain)
    }
}
