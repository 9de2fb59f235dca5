use crate::auth::AuthContext;
use crate::domains::core::repository::{date_to_db, finish_tx, FindById, HardDeletable};
use crate::domains::event::types::{Event, EventCounts, EventRow};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Sessions counted for an event: active sessions of its active modules.
const ACTIVE_EVENT_SESSIONS: &str = "SELECT COUNT(*) FROM sessions s
     JOIN modules m ON m.id = s.module_id
     WHERE s.event_id = ? AND s.active = 1 AND m.active = 1";

/// Trait defining event repository operations
#[async_trait]
pub trait EventRepository: FindById<Event> + HardDeletable + Send + Sync {
    /// Persist a fully built event.
    async fn insert_with_tx<'t>(
        &self,
        event: &Event,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Event>;

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Event>;

    /// Store every mutable column of `event`. The code is never rewritten.
    async fn update(&self, event: &Event, auth: &AuthContext) -> DomainResult<Event>;
    async fn update_with_tx<'t>(
        &self,
        event: &Event,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Event>;

    /// Events ordered by start date (newest first) then name.
    /// `trainer_id` restricts to events where that user trains an active session
    /// of an active module.
    async fn find_all(
        &self,
        params: PaginationParams,
        include_archived: bool,
        trainer_id: Option<Uuid>,
    ) -> DomainResult<PaginatedResult<Event>>;

    async fn counts(&self, id: Uuid) -> DomainResult<EventCounts>;

    /// Whether `user_id` trains at least one active session in an active module of the event.
    async fn has_trainer_session(&self, event_id: Uuid, user_id: Uuid) -> DomainResult<bool>;

    async fn add_participant(&self, event_id: Uuid, participant_id: Uuid) -> DomainResult<()>;
    async fn remove_participant(&self, event_id: Uuid, participant_id: Uuid) -> DomainResult<()>;
}

/// SQLite implementation for EventRepository
#[derive(Debug, Clone)]
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FindById<Event> for SqliteEventRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Event> {
        let row = query_as::<_, EventRow>("SELECT * FROM events WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Event".to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl HardDeletable for SqliteEventRepository {
    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        // modules, sessions and enrolment rows go with it
        let result = query("DELETE FROM events WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Event".to_string(), id))
        } else {
            Ok(())
        }
    }

    async fn hard_delete(&self, id: Uuid) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.hard_delete_with_tx(id, &mut tx).await;
        finish_tx(tx, result).await
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn insert_with_tx<'t>(
        &self,
        event: &Event,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Event> {
        query(
            r#"
            INSERT INTO events (
                id, code, name, event_type, date_start, date_end, duration_days,
                state, notes, active, created_at, updated_at,
                created_by_user_id, updated_by_user_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(&event.code)
        .bind(&event.name)
        .bind(event.event_type.as_str())
        .bind(date_to_db(&event.date_start))
        .bind(date_to_db(&event.date_end))
        .bind(event.duration_days)
        .bind(event.state.as_str())
        .bind(&event.notes)
        .bind(event.active)
        .bind(event.created_at.to_rfc3339())
        .bind(event.updated_at.to_rfc3339())
        .bind(event.created_by_user_id.map(|id| id.to_string()))
        .bind(event.updated_by_user_id.map(|id| id.to_string()))
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        self.find_by_id_with_tx(event.id, tx).await
    }

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Event> {
        let row = query_as::<_, EventRow>("SELECT * FROM events WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Event".to_string(), id))?;

        row.into_entity()
    }

    async fn update(&self, event: &Event, auth: &AuthContext) -> DomainResult<Event> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.update_with_tx(event, auth, &mut tx).await;
        finish_tx(tx, result).await
    }

    async fn update_with_tx<'t>(
        &self,
        event: &Event,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Event> {
        let result = query(
            "UPDATE events SET
                name = ?, event_type = ?, date_start = ?, date_end = ?, duration_days = ?,
                state = ?, notes = ?, active = ?, updated_at = ?, updated_by_user_id = ?
             WHERE id = ?",
        )
        .bind(&event.name)
        .bind(event.event_type.as_str())
        .bind(date_to_db(&event.date_start))
        .bind(date_to_db(&event.date_end))
        .bind(event.duration_days)
        .bind(event.state.as_str())
        .bind(&event.notes)
        .bind(event.active)
        .bind(Utc::now().to_rfc3339())
        .bind(auth.user_id.to_string())
        .bind(event.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Event".to_string(), event.id));
        }

        self.find_by_id_with_tx(event.id, tx).await
    }

    async fn find_all(
        &self,
        params: PaginationParams,
        include_archived: bool,
        trainer_id: Option<Uuid>,
    ) -> DomainResult<PaginatedResult<Event>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if !include_archived {
            conditions.push("e.active = 1");
        }
        if let Some(user_id) = trainer_id {
            conditions.push(
                "EXISTS (SELECT 1 FROM sessions s
                         JOIN modules m ON m.id = s.module_id
                         JOIN session_trainers st ON st.session_id = s.id
                         WHERE s.event_id = e.id AND s.active = 1 AND m.active = 1 AND st.user_id = ?)",
            );
            bind_values.push(user_id.to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query_str = format!("SELECT COUNT(*) FROM events e {}", where_clause);
        let mut count_query = query_scalar::<_, i64>(&count_query_str);
        for val in &bind_values {
            count_query = count_query.bind(val);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        let select_query_str = format!(
            "SELECT e.* FROM events e {} ORDER BY e.date_start DESC, e.name LIMIT ? OFFSET ?",
            where_clause
        );
        let mut select_query = query_as::<_, EventRow>(&select_query_str);
        for val in &bind_values {
            select_query = select_query.bind(val);
        }
        let rows = select_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        let entities = rows
            .into_iter()
            .map(EventRow::into_entity)
            .collect::<DomainResult<Vec<Event>>>()?;

        Ok(PaginatedResult::new(entities, total as u64, params))
    }

    async fn counts(&self, id: Uuid) -> DomainResult<EventCounts> {
        let id_str = id.to_string();

        let module_count: i64 =
            query_scalar("SELECT COUNT(*) FROM modules WHERE event_id = ? AND active = 1")
                .bind(&id_str)
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;

        let session_count: i64 = query_scalar(ACTIVE_EVENT_SESSIONS)
            .bind(&id_str)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        let participant_count: i64 = query_scalar(
            "SELECT COUNT(*) FROM event_participants ep
             JOIN participants p ON p.id = ep.participant_id
             WHERE ep.event_id = ? AND p.active = 1",
        )
        .bind(&id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(EventCounts {
            module_count,
            session_count,
            participant_count,
        })
    }

    async fn has_trainer_session(&self, event_id: Uuid, user_id: Uuid) -> DomainResult<bool> {
        let exists: bool = query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM sessions s
                JOIN modules m ON m.id = s.module_id
                JOIN session_trainers st ON st.session_id = s.id
                WHERE s.event_id = ? AND s.active = 1 AND m.active = 1 AND st.user_id = ?
            )",
        )
        .bind(event_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(exists)
    }

    async fn add_participant(&self, event_id: Uuid, participant_id: Uuid) -> DomainResult<()> {
        query(
            "INSERT INTO event_participants (event_id, participant_id, created_at) VALUES (?, ?, ?)
             ON CONFLICT(event_id, participant_id) DO NOTHING",
        )
        .bind(event_id.to_string())
        .bind(participant_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(())
    }

    async fn remove_participant(&self, event_id: Uuid, participant_id: Uuid) -> DomainResult<()> {
        let result = query("DELETE FROM event_participants WHERE event_id = ? AND participant_id = ?")
            .bind(event_id.to_string())
            .bind(participant_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("EventParticipant".to_string(), participant_id));
        }
        Ok(())
    }
}
