use crate::auth::AuthContext;
use crate::domains::core::repository::finish_tx;
use crate::domains::event::repository::EventRepository;
use crate::domains::event::sequence::CodeSequence;
use crate::domains::event::types::{
    CloneEventRequest, Event, EventResponse, EventState, NewEvent, UpdateEvent,
};
use crate::domains::module::repository::ModuleRepository;
use crate::domains::module::types::Module;
use crate::domains::participant::repository::ParticipantRepository;
use crate::domains::participant::types::Participant;
use crate::domains::permission::Permission;
use crate::domains::schedule::{duration_days, group_by_day, DayGroup};
use crate::domains::session::repository::SessionRepository;
use crate::domains::session::types::Session;
use crate::errors::{DbError, DomainResult, ServiceError, ServiceResult};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::Validate;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining event service operations
#[async_trait]
pub trait EventService: Send + Sync {
    async fn create_event(&self, new_event: NewEvent, auth: &AuthContext) -> ServiceResult<EventResponse>;

    async fn get_event(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<EventResponse>;

    async fn list_events(
        &self,
        params: PaginationParams,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<EventResponse>>;

    async fn update_event(
        &self,
        id: Uuid,
        update: UpdateEvent,
        auth: &AuthContext,
    ) -> ServiceResult<EventResponse>;

    /// Delete an event together with its modules and sessions.
    async fn delete_event(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()>;

    async fn add_participant(&self, event_id: Uuid, participant_id: Uuid, auth: &AuthContext) -> ServiceResult<()>;

    async fn remove_participant(&self, event_id: Uuid, participant_id: Uuid, auth: &AuthContext) -> ServiceResult<()>;

    async fn list_participants(&self, event_id: Uuid, auth: &AuthContext) -> ServiceResult<Vec<Participant>>;

    /// Prefilled clone request for an event.
    async fn clone_defaults(&self, event_id: Uuid, auth: &AuthContext) -> ServiceResult<CloneEventRequest>;

    /// Copy an event with its active modules and sessions. Returns the new event id.
    async fn clone_event(&self, request: CloneEventRequest, auth: &AuthContext) -> ServiceResult<Uuid>;

    async fn sessions_grouped_by_day(
        &self,
        event_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<DayGroup<Session>>>;
}

/// Implementation of the event service
#[derive(Clone)]
pub struct EventServiceImpl {
    pool: SqlitePool,
    event_repo: Arc<dyn EventRepository>,
    module_repo: Arc<dyn ModuleRepository>,
    session_repo: Arc<dyn SessionRepository>,
    participant_repo: Arc<dyn ParticipantRepository>,
    code_sequence: Arc<dyn CodeSequence>,
}

impl EventServiceImpl {
    pub fn new(
        pool: SqlitePool,
        event_repo: Arc<dyn EventRepository>,
        module_repo: Arc<dyn ModuleRepository>,
        session_repo: Arc<dyn SessionRepository>,
        participant_repo: Arc<dyn ParticipantRepository>,
        code_sequence: Arc<dyn CodeSequence>,
    ) -> Self {
        Self {
            pool,
            event_repo,
            module_repo,
            session_repo,
            participant_repo,
            code_sequence,
        }
    }

    async fn enrich(&self, event: Event) -> ServiceResult<EventResponse> {
        let counts = self.event_repo.counts(event.id).await?;
        Ok(EventResponse::from_event(event, counts))
    }

    /// Load an event the caller may see. Trainers only see events they teach in.
    async fn visible_event(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<Event> {
        auth.authorize(Permission::ViewEvents)?;
        let event = self.event_repo.find_by_id(id).await?;
        if let Some(user_id) = auth.trainer_scope() {
            if !self.event_repo.has_trainer_session(id, user_id).await? {
                return Err(ServiceError::PermissionDenied(
                    "Trainers may only access events with an assigned session".to_string(),
                ));
            }
        }
        Ok(event)
    }

    async fn create_in_tx<'t>(
        &self,
        new_event: NewEvent,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Event> {
        let code = self.code_sequence.next_code_with_tx(tx).await?;
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            code,
            name: new_event.name.trim().to_string(),
            event_type: new_event.event_type,
            date_start: new_event.date_start,
            date_end: new_event.date_end,
            duration_days: duration_days(Some(new_event.date_start), Some(new_event.date_end)),
            state: new_event.state,
            notes: new_event.notes,
            active: true,
            created_at: now,
            updated_at: now,
            created_by_user_id: Some(auth.user_id),
            updated_by_user_id: Some(auth.user_id),
        };
        self.event_repo.insert_with_tx(&event, tx).await
    }

    async fn clone_in_tx<'t>(
        &self,
        source: &Event,
        request: &CloneEventRequest,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Event> {
        // the sequence bump is the first write and takes the lock for the copy
        let code = self.code_sequence.next_code_with_tx(tx).await?;
        let now = Utc::now();

        let clone = Event {
            id: Uuid::new_v4(),
            code,
            name: request.new_name.trim().to_string(),
            event_type: source.event_type,
            date_start: request.new_date_start,
            date_end: request.new_date_end,
            duration_days: request.new_duration_days(),
            state: EventState::Draft,
            notes: source.notes.clone(),
            active: true,
            created_at: now,
            updated_at: now,
            created_by_user_id: Some(auth.user_id),
            updated_by_user_id: Some(auth.user_id),
        };
        let created = self.event_repo.insert_with_tx(&clone, tx).await?;

        let modules = self.module_repo.find_active_by_event_with_tx(source.id, tx).await?;
        let mut session_total = 0usize;
        for module in &modules {
            let module_copy = Module {
                id: Uuid::new_v4(),
                event_id: created.id,
                created_at: now,
                updated_at: now,
                ..module.clone()
            };
            self.module_repo.insert_with_tx(&module_copy, tx).await?;

            // session date-times are carried over as they are
            let sessions = self.session_repo.find_active_by_module_with_tx(module.id, tx).await?;
            for session in sessions {
                let session_copy = Session {
                    id: Uuid::new_v4(),
                    module_id: module_copy.id,
                    event_id: created.id,
                    created_at: now,
                    updated_at: now,
                    ..session
                };
                self.session_repo.insert_with_tx(&session_copy, tx).await?;
                session_total += 1;
            }
        }

        debug!(
            "Copied {} modules and {} sessions from event {} into {}",
            modules.len(),
            session_total,
            source.id,
            created.id
        );
        Ok(created)
    }
}

#[async_trait]
impl EventService for EventServiceImpl {
    async fn create_event(&self, new_event: NewEvent, auth: &AuthContext) -> ServiceResult<EventResponse> {
        auth.authorize(Permission::CreateEvents)?;
        if let Err(err) = new_event.validate() {
            warn!("Rejected event create: {}", err);
            return Err(err.into());
        }

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.create_in_tx(new_event, auth, &mut tx).await;
        let created = finish_tx(tx, result).await?;

        info!("Created event {} ({})", created.code, created.id);
        self.enrich(created).await
    }

    async fn get_event(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<EventResponse> {
        let event = self.visible_event(id, auth).await?;
        self.enrich(event).await
    }

    async fn list_events(
        &self,
        params: PaginationParams,
        include_archived: bool,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<EventResponse>> {
        auth.authorize(Permission::ViewEvents)?;

        let page = self
            .event_repo
            .find_all(params, include_archived, auth.trainer_scope())
            .await?;

        let mut items = Vec::with_capacity(page.items.len());
        for event in page.items {
            items.push(self.enrich(event).await?);
        }

        Ok(PaginatedResult {
            items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
        })
    }

    async fn update_event(
        &self,
        id: Uuid,
        update: UpdateEvent,
        auth: &AuthContext,
    ) -> ServiceResult<EventResponse> {
        auth.authorize(Permission::EditEvents)?;

        let current = self.event_repo.find_by_id(id).await?;
        let merged = current.merged(&update);
        if let Err(err) = merged.validate() {
            warn!("Rejected event {} update: {}", id, err);
            return Err(err.into());
        }

        let updated = self.event_repo.update(&merged, auth).await?;
        info!("Updated event {} ({})", updated.code, updated.id);
        self.enrich(updated).await
    }

    async fn delete_event(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        auth.authorize(Permission::DeleteEvents)?;
        self.event_repo.hard_delete(id).await?;
        info!("Deleted event {} with its modules and sessions", id);
        Ok(())
    }

    async fn add_participant(&self, event_id: Uuid, participant_id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        auth.authorize(Permission::EditEvents)?;
        self.event_repo.find_by_id(event_id).await?;
        self.participant_repo.find_by_id(participant_id).await?;

        self.event_repo.add_participant(event_id, participant_id).await?;
        info!("Enrolled participant {} in event {}", participant_id, event_id);
        Ok(())
    }

    async fn remove_participant(&self, event_id: Uuid, participant_id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        auth.authorize(Permission::EditEvents)?;
        self.event_repo.remove_participant(event_id, participant_id).await?;
        info!("Removed participant {} from event {}", participant_id, event_id);
        Ok(())
    }

    async fn list_participants(&self, event_id: Uuid, auth: &AuthContext) -> ServiceResult<Vec<Participant>> {
        auth.authorize(Permission::ViewParticipants)?;
        self.visible_event(event_id, auth).await?;
        self.participant_repo
            .find_by_event(event_id)
            .await
            .map_err(ServiceError::Domain)
    }

    async fn clone_defaults(&self, event_id: Uuid, auth: &AuthContext) -> ServiceResult<CloneEventRequest> {
        auth.authorize(Permission::CloneEvents)?;
        let source = self.event_repo.find_by_id(event_id).await?;
        Ok(CloneEventRequest::defaults_for(&source))
    }

    async fn clone_event(&self, request: CloneEventRequest, auth: &AuthContext) -> ServiceResult<Uuid> {
        auth.authorize(Permission::CloneEvents)?;

        let source = self.event_repo.find_by_id(request.source_event_id).await?;
        if let Err(err) = request.validate_against(&source) {
            warn!("Rejected clone of event {}: {}", source.code, err);
            return Err(err.into());
        }

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.clone_in_tx(&source, &request, auth, &mut tx).await;
        let clone = finish_tx(tx, result).await?;

        info!(
            "Cloned event {} into {} ({}) for {} - {}",
            source.code, clone.code, clone.id, clone.date_start, clone.date_end
        );
        Ok(clone.id)
    }

    async fn sessions_grouped_by_day(
        &self,
        event_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<DayGroup<Session>>> {
        auth.authorize(Permission::ViewSessions)?;
        self.visible_event(event_id, auth).await?;

        let sessions = self
            .session_repo
            .find_by_event(event_id, false, auth.trainer_scope())
            .await?;

        Ok(group_by_day(sessions))
    }
}
