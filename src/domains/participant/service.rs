use crate::auth::AuthContext;
use crate::domains::participant::repository::ParticipantRepository;
use crate::domains::participant::types::{NewParticipant, Participant, ParticipantRole, UpdateParticipant};
use crate::domains::permission::Permission;
use crate::domains::user::repository::UserRepository;
use crate::errors::{ServiceError, ServiceResult, ValidationError};
use crate::validation::Validate;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining participant service operations
#[async_trait]
pub trait ParticipantService: Send + Sync {
    async fn create_participant(
        &self,
        new_participant: NewParticipant,
        auth: &AuthContext,
    ) -> ServiceResult<Participant>;

    async fn update_participant(
        &self,
        id: Uuid,
        update: UpdateParticipant,
        auth: &AuthContext,
    ) -> ServiceResult<Participant>;

    async fn get_participant(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Participant>;

    async fn list_participants(
        &self,
        role: Option<ParticipantRole>,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<Participant>>;

    async fn delete_participant(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()>;
}

/// Implementation of the participant service
#[derive(Clone)]
pub struct ParticipantServiceImpl {
    repo: Arc<dyn ParticipantRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl ParticipantServiceImpl {
    pub fn new(repo: Arc<dyn ParticipantRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { repo, user_repo }
    }

    async fn ensure_user_exists(&self, user_id: Option<Uuid>) -> ServiceResult<()> {
        if let Some(user_id) = user_id {
            let missing = self.user_repo.find_missing_ids(&[user_id]).await?;
            if !missing.is_empty() {
                return Err(ValidationError::relationship(&format!("User {} does not exist", user_id)).into());
            }
        }
        Ok(())
    }
}

fn log_rejection(err: &ServiceError) {
    if let Some(validation) = err.validation() {
        warn!("Rejected participant write: {}", validation);
    } else if err.is_unique_violation() {
        warn!("Rejected participant write: contact already registered with this role");
    }
}

#[async_trait]
impl ParticipantService for ParticipantServiceImpl {
    async fn create_participant(
        &self,
        new_participant: NewParticipant,
        auth: &AuthContext,
    ) -> ServiceResult<Participant> {
        auth.authorize(Permission::CreateParticipants)?;

        let result = async {
            new_participant.validate()?;
            self.ensure_user_exists(new_participant.user_id).await?;
            self.repo
                .create(&new_participant)
                .await
                .map_err(ServiceError::Domain)
        }
        .await;

        match result {
            Ok(participant) => {
                info!(
                    "Created {} participant {} for contact {}",
                    participant.role.as_str(),
                    participant.id,
                    participant.contact_id
                );
                Ok(participant)
            }
            Err(err) => {
                log_rejection(&err);
                Err(err)
            }
        }
    }

    async fn update_participant(
        &self,
        id: Uuid,
        update: UpdateParticipant,
        auth: &AuthContext,
    ) -> ServiceResult<Participant> {
        auth.authorize(Permission::EditParticipants)?;

        let current = self.repo.find_by_id(id).await?;
        let merged = current.merged(&update);

        let result = async {
            merged.validate()?;
            if merged.user_id != current.user_id {
                self.ensure_user_exists(merged.user_id).await?;
            }
            self.repo.update(&merged).await.map_err(ServiceError::Domain)
        }
        .await;

        if let Err(err) = &result {
            log_rejection(err);
        } else {
            info!("Updated participant {}", id);
        }
        result
    }

    async fn get_participant(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Participant> {
        auth.authorize(Permission::ViewParticipants)?;
        self.repo.find_by_id(id).await.map_err(ServiceError::Domain)
    }

    async fn list_participants(
        &self,
        role: Option<ParticipantRole>,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<Participant>> {
        auth.authorize(Permission::ViewParticipants)?;
        self.repo
            .find_all(role, include_archived)
            .await
            .map_err(ServiceError::Domain)
    }

    async fn delete_participant(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        auth.authorize(Permission::DeleteParticipants)?;
        self.repo.hard_delete(id).await?;
        info!("Deleted participant {}", id);
        Ok(())
    }
}
