use crate::auth::AuthContext;
use crate::domains::attachment::repository::AttachmentRepository;
use crate::domains::core::repository::finish_tx;
use crate::domains::module::repository::ModuleRepository;
use crate::domains::permission::Permission;
use crate::domains::schedule::ensure_no_overlap;
use crate::domains::session::repository::SessionRepository;
use crate::domains::session::types::{NewSession, Session, UpdateSession};
use crate::domains::user::repository::UserRepository;
use crate::errors::{DbError, DomainError, DomainResult, ServiceError, ServiceResult, ValidationError};
use crate::validation::Validate;
use async_trait::async_trait;
use log::{info, warn};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use uuid::Uuid;

/// Reject `session` if it collides with another active session of its event.
///
/// Must run inside the writing transaction, after the owning row was touched.
pub(crate) async fn check_session_overlap_with_tx<'t>(
    session_repo: &dyn SessionRepository,
    session: &Session,
    tx: &mut Transaction<'t, Sqlite>,
) -> DomainResult<()> {
    if !session.active {
        return Ok(());
    }
    let siblings = session_repo
        .find_slots_by_event_with_tx(session.event_id, tx)
        .await?;
    ensure_no_overlap(Some(session.id), session.date_start, session.date_end, &siblings)?;
    Ok(())
}

/// Trait defining session service operations
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn create_session(&self, new_session: NewSession, auth: &AuthContext) -> ServiceResult<Session>;

    async fn update_session(
        &self,
        id: Uuid,
        update: UpdateSession,
        auth: &AuthContext,
    ) -> ServiceResult<Session>;

    async fn get_session(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Session>;

    async fn list_sessions_for_event(
        &self,
        event_id: Uuid,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<Session>>;

    async fn list_sessions_for_module(
        &self,
        module_id: Uuid,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<Session>>;

    async fn delete_session(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()>;
}

/// Implementation of the session service
#[derive(Clone)]
pub struct SessionServiceImpl {
    pool: SqlitePool,
    session_repo: Arc<dyn SessionRepository>,
    module_repo: Arc<dyn ModuleRepository>,
    user_repo: Arc<dyn UserRepository>,
    attachment_repo: Arc<dyn AttachmentRepository>,
}

impl SessionServiceImpl {
    pub fn new(
        pool: SqlitePool,
        session_repo: Arc<dyn SessionRepository>,
        module_repo: Arc<dyn ModuleRepository>,
        user_repo: Arc<dyn UserRepository>,
        attachment_repo: Arc<dyn AttachmentRepository>,
    ) -> Self {
        Self {
            pool,
            session_repo,
            module_repo,
            user_repo,
            attachment_repo,
        }
    }

    async fn ensure_links_exist(
        &self,
        trainer_ids: Option<&[Uuid]>,
        attachment_ids: Option<&[Uuid]>,
    ) -> ServiceResult<()> {
        if let Some(ids) = trainer_ids {
            let missing = self.user_repo.find_missing_ids(ids).await?;
            if let Some(id) = missing.first() {
                return Err(ValidationError::relationship(&format!("Trainer user {} does not exist", id)).into());
            }
        }
        if let Some(ids) = attachment_ids {
            let missing = self.attachment_repo.find_missing_ids(ids).await?;
            if let Some(id) = missing.first() {
                return Err(ValidationError::relationship(&format!("Attachment {} does not exist", id)).into());
            }
        }
        Ok(())
    }

    async fn create_in_tx<'t>(
        &self,
        new_session: NewSession,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Session> {
        // write lock first, then read the siblings
        self.module_repo.touch_with_tx(new_session.module_id, tx).await?;
        let module = self.module_repo.find_by_id_with_tx(new_session.module_id, tx).await?;

        let session = new_session.into_session(module.event_id);
        check_session_overlap_with_tx(self.session_repo.as_ref(), &session, tx).await?;

        self.session_repo.insert_with_tx(&session, tx).await
    }

    async fn update_in_tx<'t>(
        &self,
        id: Uuid,
        update: &UpdateSession,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Session> {
        self.session_repo.touch_with_tx(id, tx).await?;
        let current = self.session_repo.find_by_id_with_tx(id, tx).await?;

        let mut merged = current.merged(update);
        if merged.module_id != current.module_id {
            let module = self.module_repo.find_by_id_with_tx(merged.module_id, tx).await?;
            merged.event_id = module.event_id;
        }
        merged.validate()?;

        // the caller must stay on the session it edits
        if let Some(user_id) = auth.trainer_scope() {
            if !merged.trainer_ids.contains(&user_id) {
                return Err(DomainError::AuthorizationFailed(
                    "Trainers cannot unassign themselves from a session".to_string(),
                ));
            }
        }

        if current.schedule_changed(&merged) {
            check_session_overlap_with_tx(self.session_repo.as_ref(), &merged, tx).await?;
        }

        self.session_repo.update_with_tx(&merged, tx).await
    }
}

fn log_rejection<T>(action: &str, result: &DomainResult<T>) {
    if let Err(DomainError::Validation(err)) = result {
        warn!("Rejected session {}: {}", action, err);
    }
}

#[async_trait]
impl SessionService for SessionServiceImpl {
    async fn create_session(&self, new_session: NewSession, auth: &AuthContext) -> ServiceResult<Session> {
        auth.authorize(Permission::CreateSessions)?;
        new_session.validate()?;
        self.ensure_links_exist(Some(&new_session.trainer_ids), Some(&new_session.attachment_ids))
            .await?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.create_in_tx(new_session, &mut tx).await;
        log_rejection("create", &result);
        let session = finish_tx(tx, result).await?;

        info!(
            "Created session {} '{}' in event {}",
            session.id, session.name, session.event_id
        );
        Ok(session)
    }

    async fn update_session(
        &self,
        id: Uuid,
        update: UpdateSession,
        auth: &AuthContext,
    ) -> ServiceResult<Session> {
        auth.authorize(Permission::EditSessions)?;

        let current = self.session_repo.find_by_id(id).await?;
        auth.authorize_session_assignment(&current.trainer_ids)?;
        if update.module_id.map_or(false, |module_id| module_id != current.module_id) {
            auth.authorize(Permission::EditModules)?;
        }
        self.ensure_links_exist(update.trainer_ids.as_deref(), update.attachment_ids.as_deref())
            .await?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.update_in_tx(id, &update, auth, &mut tx).await;
        log_rejection("update", &result);
        let session = finish_tx(tx, result).await.map_err(|e| match e {
            DomainError::AuthorizationFailed(msg) => ServiceError::PermissionDenied(msg),
            other => ServiceError::Domain(other),
        })?;

        info!("Updated session {}", session.id);
        Ok(session)
    }

    async fn get_session(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Session> {
        auth.authorize(Permission::ViewSessions)?;
        let session = self.session_repo.find_by_id(id).await?;
        auth.authorize_session_assignment(&session.trainer_ids)?;
        Ok(session)
    }

    async fn list_sessions_for_event(
        &self,
        event_id: Uuid,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<Session>> {
        auth.authorize(Permission::ViewSessions)?;
        self.session_repo
            .find_by_event(event_id, include_archived, auth.trainer_scope())
            .await
            .map_err(ServiceError::Domain)
    }

    async fn list_sessions_for_module(
        &self,
        module_id: Uuid,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<Session>> {
        auth.authorize(Permission::ViewSessions)?;
        self.session_repo
            .find_by_module(module_id, include_archived, auth.trainer_scope())
            .await
            .map_err(ServiceError::Domain)
    }

    async fn delete_session(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        auth.authorize(Permission::DeleteSessions)?;
        self.session_repo.hard_delete(id).await?;
        info!("Deleted session {}", id);
        Ok(())
    }
}
