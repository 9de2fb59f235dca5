use crate::auth::AuthContext;
use crate::domains::core::repository::finish_tx;
use crate::domains::event::repository::EventRepository;
use crate::domains::module::repository::ModuleRepository;
use crate::domains::module::types::{Module, ModuleResponse, NewModule, UpdateModule};
use crate::domains::permission::Permission;
use crate::domains::schedule::ensure_no_overlap;
use crate::domains::session::repository::SessionRepository;
use crate::errors::{DbError, DomainError, DomainResult, ServiceError, ServiceResult};
use crate::validation::Validate;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining module service operations
#[async_trait]
pub trait ModuleService: Send + Sync {
    async fn create_module(&self, new_module: NewModule, auth: &AuthContext) -> ServiceResult<ModuleResponse>;

    /// Update a module. Changing `event_id` moves all of its sessions along.
    async fn update_module(
        &self,
        id: Uuid,
        update: UpdateModule,
        auth: &AuthContext,
    ) -> ServiceResult<ModuleResponse>;

    async fn get_module(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<ModuleResponse>;

    async fn list_modules(
        &self,
        event_id: Uuid,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<ModuleResponse>>;

    async fn delete_module(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()>;
}

/// Implementation of the module service
#[derive(Clone)]
pub struct ModuleServiceImpl {
    pool: SqlitePool,
    module_repo: Arc<dyn ModuleRepository>,
    event_repo: Arc<dyn EventRepository>,
    session_repo: Arc<dyn SessionRepository>,
}

impl ModuleServiceImpl {
    pub fn new(
        pool: SqlitePool,
        module_repo: Arc<dyn ModuleRepository>,
        event_repo: Arc<dyn EventRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            pool,
            module_repo,
            event_repo,
            session_repo,
        }
    }

    async fn enrich(&self, module: Module) -> ServiceResult<ModuleResponse> {
        let session_count = self.module_repo.session_count(module.id).await?;
        Ok(ModuleResponse::from_module(module, session_count))
    }

    async fn update_in_tx<'t>(
        &self,
        id: Uuid,
        update: &UpdateModule,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Module> {
        self.module_repo.touch_with_tx(id, tx).await?;
        let current = self.module_repo.find_by_id_with_tx(id, tx).await?;

        let merged = current.merged(update);
        merged.validate()?;

        let moving = merged.event_id != current.event_id;
        if moving {
            self.event_repo.find_by_id_with_tx(merged.event_id, tx).await?;
        }

        let updated = self.module_repo.update_with_tx(&merged, tx).await?;

        if moving {
            let moved = self
                .session_repo
                .reassign_event_for_module_with_tx(id, merged.event_id, tx)
                .await?;
            debug!(
                "Module {} moved {} sessions to event {}",
                id,
                moved.len(),
                merged.event_id
            );
        }

        // sessions re-entering a schedule: moved, or of a reactivated module
        if merged.active && (moving || !current.active) {
            let own = self.session_repo.find_active_by_module_with_tx(id, tx).await?;
            let slots = self
                .session_repo
                .find_slots_by_event_with_tx(merged.event_id, tx)
                .await?;
            for session in &own {
                ensure_no_overlap(Some(session.id), session.date_start, session.date_end, &slots)?;
            }
        }

        Ok(updated)
    }
}

#[async_trait]
impl ModuleService for ModuleServiceImpl {
    async fn create_module(&self, new_module: NewModule, auth: &AuthContext) -> ServiceResult<ModuleResponse> {
        auth.authorize(Permission::EditModules)?;
        new_module.validate()?;

        // fail with a clear not-found before touching the store
        self.event_repo.find_by_id(new_module.event_id).await?;

        let now = Utc::now();
        let module = Module {
            id: Uuid::new_v4(),
            event_id: new_module.event_id,
            name: new_module.name.trim().to_string(),
            description: new_module.description,
            notes: new_module.notes,
            sequence: new_module.sequence,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.module_repo.insert_with_tx(&module, &mut tx).await;
        let created = finish_tx(tx, result).await?;

        info!("Created module {} in event {}", created.id, created.event_id);
        Ok(ModuleResponse::from_module(created, 0))
    }

    async fn update_module(
        &self,
        id: Uuid,
        update: UpdateModule,
        auth: &AuthContext,
    ) -> ServiceResult<ModuleResponse> {
        auth.authorize(Permission::EditModules)?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.update_in_tx(id, &update, &mut tx).await;
        if let Err(DomainError::Validation(err)) = &result {
            warn!("Rejected module {} update: {}", id, err);
        }
        let updated = finish_tx(tx, result).await?;

        info!("Updated module {}", id);
        self.enrich(updated).await
    }

    async fn get_module(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<ModuleResponse> {
        auth.authorize(Permission::ViewModules)?;
        let module = self.module_repo.find_by_id(id).await?;
        self.enrich(module).await
    }

    async fn list_modules(
        &self,
        event_id: Uuid,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<ModuleResponse>> {
        auth.authorize(Permission::ViewModules)?;
        let modules = self
            .module_repo
            .find_by_event(event_id, include_archived)
            .await
            .map_err(ServiceError::Domain)?;

        let mut responses = Vec::with_capacity(modules.len());
        for module in modules {
            responses.push(self.enrich(module).await?);
        }
        Ok(responses)
    }

    async fn delete_module(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        auth.authorize(Permission::EditModules)?;
        self.module_repo.hard_delete(id).await?;
        info!("Deleted module {} with its sessions", id);
        Ok(())
    }
}
