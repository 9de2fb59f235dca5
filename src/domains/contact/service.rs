use crate::auth::AuthContext;
use crate::domains::contact::repository::ContactRepository;
use crate::domains::contact::types::{Contact, NewContact, UpdateContact};
use crate::errors::{ServiceError, ServiceResult};
use crate::types::Permission;
use crate::validation::Validate;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining contact directory operations
#[async_trait]
pub trait ContactService: Send + Sync {
    async fn create_contact(&self, new_contact: NewContact, auth: &AuthContext) -> ServiceResult<Contact>;

    async fn get_contact(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Contact>;

    /// Update a contact. A rename is mirrored onto its participants.
    async fn update_contact(
        &self,
        id: Uuid,
        update: UpdateContact,
        auth: &AuthContext,
    ) -> ServiceResult<Contact>;
}

/// Implementation of the contact service
#[derive(Clone)]
pub struct ContactServiceImpl {
    repo: Arc<dyn ContactRepository>,
}

impl ContactServiceImpl {
    pub fn new(repo: Arc<dyn ContactRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ContactService for ContactServiceImpl {
    async fn create_contact(&self, new_contact: NewContact, auth: &AuthContext) -> ServiceResult<Contact> {
        auth.authorize(Permission::EditContacts)?;
        new_contact.validate()?;

        let contact = self.repo.create(&new_contact).await?;
        info!("Created contact {}", contact.id);
        Ok(contact)
    }

    async fn get_contact(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Contact> {
        auth.authorize(Permission::ViewContacts)?;
        self.repo.find_by_id(id).await.map_err(ServiceError::Domain)
    }

    async fn update_contact(
        &self,
        id: Uuid,
        update: UpdateContact,
        auth: &AuthContext,
    ) -> ServiceResult<Contact> {
        auth.authorize(Permission::EditContacts)?;

        let current = self.repo.find_by_id(id).await?;
        let merged = current.merged(&update);
        merged.validate()?;

        let updated = self.repo.update(&merged).await?;
        info!("Updated contact {}", id);
        Ok(updated)
    }
}
