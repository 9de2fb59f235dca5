use crate::domains::core::repository::{datetime_to_db, finish_tx, parse_uuid, FindById, HardDeletable};
use crate::domains::session::types::{Session, SessionRow, SessionSlot, SessionSlotRow};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, Sqlite, SqliteConnection, SqlitePool, Transaction};
use uuid::Uuid;

const SESSION_ORDER: &str = "ORDER BY s.date_start, s.sequence, s.name";

/// Trait defining session repository operations
#[async_trait]
pub trait SessionRepository: FindById<Session> + HardDeletable + Send + Sync {
    /// Persist a fully built session together with its trainer and attachment links.
    async fn insert_with_tx<'t>(
        &self,
        session: &Session,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Session>;

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Session>;

    /// Store every mutable column and replace the link sets.
    async fn update_with_tx<'t>(
        &self,
        session: &Session,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Session>;

    /// No-op write on the session row, taking the database write lock.
    async fn touch_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<()>;

    /// Active sessions of the event's active modules, as seen by the overlap scan.
    async fn find_slots_by_event_with_tx<'t>(
        &self,
        event_id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Vec<SessionSlot>>;

    /// Active sessions of a module ordered by start, sequence and name.
    async fn find_active_by_module_with_tx<'t>(
        &self,
        module_id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Vec<Session>>;

    /// Point every session of `module_id` at `event_id`. Returns the moved session ids.
    async fn reassign_event_for_module_with_tx<'t>(
        &self,
        module_id: Uuid,
        event_id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Vec<Uuid>>;

    /// Sessions of an event ordered by start, sequence and name.
    ///
    /// Without `include_archived` only active sessions of active modules are
    /// returned. `trainer_id` keeps only sessions that user is assigned to.
    async fn find_by_event(
        &self,
        event_id: Uuid,
        include_archived: bool,
        trainer_id: Option<Uuid>,
    ) -> DomainResult<Vec<Session>>;

    async fn find_by_module(
        &self,
        module_id: Uuid,
        include_archived: bool,
        trainer_id: Option<Uuid>,
    ) -> DomainResult<Vec<Session>>;

    /// Trainer display names for a session, sorted.
    async fn trainer_names(&self, session_id: Uuid) -> DomainResult<Vec<String>>;
}

/// SQLite implementation for SessionRepository
#[derive(Debug, Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_links(conn: &mut SqliteConnection, row: SessionRow) -> DomainResult<Session> {
        let trainer_ids: Vec<String> =
            query_scalar("SELECT user_id FROM session_trainers WHERE session_id = ? ORDER BY user_id")
                .bind(&row.id)
                .fetch_all(&mut *conn)
                .await
                .map_err(DbError::from)?;

        let attachment_ids: Vec<String> = query_scalar(
            "SELECT attachment_id FROM session_attachments WHERE session_id = ? ORDER BY attachment_id",
        )
        .bind(&row.id)
        .fetch_all(&mut *conn)
        .await
        .map_err(DbError::from)?;

        let trainer_ids = trainer_ids
            .iter()
            .map(|id| parse_uuid(id, "session_trainers.user_id"))
            .collect::<DomainResult<Vec<Uuid>>>()?;
        let attachment_ids = attachment_ids
            .iter()
            .map(|id| parse_uuid(id, "session_attachments.attachment_id"))
            .collect::<DomainResult<Vec<Uuid>>>()?;

        row.into_entity(trainer_ids, attachment_ids)
    }

    async fn fetch_one(conn: &mut SqliteConnection, id: Uuid) -> DomainResult<Session> {
        let row = query_as::<_, SessionRow>("SELECT * FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Session".to_string(), id))?;

        Self::load_links(conn, row).await
    }

    async fn fetch_many(
        conn: &mut SqliteConnection,
        sql: &str,
        binds: &[String],
    ) -> DomainResult<Vec<Session>> {
        let mut select_query = query_as::<_, SessionRow>(sql);
        for val in binds {
            select_query = select_query.bind(val);
        }
        let rows = select_query
            .fetch_all(&mut *conn)
            .await
            .map_err(DbError::from)?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(Self::load_links(conn, row).await?);
        }
        Ok(sessions)
    }

    async fn write_links(conn: &mut SqliteConnection, session: &Session) -> DomainResult<()> {
        let id = session.id.to_string();

        query("DELETE FROM session_trainers WHERE session_id = ?")
            .bind(&id)
            .execute(&mut *conn)
            .await
            .map_err(DbError::from)?;
        for user_id in &session.trainer_ids {
            query("INSERT INTO session_trainers (session_id, user_id) VALUES (?, ?)")
                .bind(&id)
                .bind(user_id.to_string())
                .execute(&mut *conn)
                .await
                .map_err(DbError::from)?;
        }

        query("DELETE FROM session_attachments WHERE session_id = ?")
            .bind(&id)
            .execute(&mut *conn)
            .await
            .map_err(DbError::from)?;
        for attachment_id in &session.attachment_ids {
            query("INSERT INTO session_attachments (session_id, attachment_id) VALUES (?, ?)")
                .bind(&id)
                .bind(attachment_id.to_string())
                .execute(&mut *conn)
                .await
                .map_err(DbError::from)?;
        }
        Ok(())
    }

    fn list_query(owner_column: &str, include_archived: bool, trainer_id: Option<Uuid>) -> String {
        let mut conditions = vec![format!("s.{} = ?", owner_column)];
        if !include_archived {
            conditions.push("s.active = 1".to_string());
            conditions.push("m.active = 1".to_string());
        }
        if trainer_id.is_some() {
            conditions.push(
                "EXISTS (SELECT 1 FROM session_trainers st WHERE st.session_id = s.id AND st.user_id = ?)"
                    .to_string(),
            );
        }
        format!(
            "SELECT s.* FROM sessions s JOIN modules m ON m.id = s.module_id WHERE {} {}",
            conditions.join(" AND "),
            SESSION_ORDER
        )
    }
}

#[async_trait]
impl FindById<Session> for SqliteSessionRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Session> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        Self::fetch_one(&mut conn, id).await
    }
}

#[async_trait]
impl HardDeletable for SqliteSessionRepository {
    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let result = query("DELETE FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Session".to_string(), id))
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
impl SessionRepository for SqliteSessionRepository {
    async fn insert_with_tx<'t>(
        &self,
        session: &Session,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Session> {
        query(
            r#"
            INSERT INTO sessions (
                id, module_id, event_id, name, date_start, date_end, duration_hours,
                state, description, materials, notes, sequence, active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.id.to_string())
        .bind(session.module_id.to_string())
        .bind(session.event_id.to_string())
        .bind(&session.name)
        .bind(datetime_to_db(&session.date_start))
        .bind(datetime_to_db(&session.date_end))
        .bind(session.duration_hours)
        .bind(session.state.as_str())
        .bind(&session.description)
        .bind(&session.materials)
        .bind(&session.notes)
        .bind(session.sequence)
        .bind(session.active)
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        Self::write_links(&mut **tx, session).await?;
        Self::fetch_one(&mut **tx, session.id).await
    }

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Session> {
        Self::fetch_one(&mut **tx, id).await
    }

    async fn update_with_tx<'t>(
        &self,
        session: &Session,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Session> {
        let result = query(
            "UPDATE sessions SET
                module_id = ?, event_id = ?, name = ?, date_start = ?, date_end = ?,
                duration_hours = ?, state = ?, description = ?, materials = ?, notes = ?,
                sequence = ?, active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(session.module_id.to_string())
        .bind(session.event_id.to_string())
        .bind(&session.name)
        .bind(datetime_to_db(&session.date_start))
        .bind(datetime_to_db(&session.date_end))
        .bind(session.duration_hours)
        .bind(session.state.as_str())
        .bind(&session.description)
        .bind(&session.materials)
        .bind(&session.notes)
        .bind(session.sequence)
        .bind(session.active)
        .bind(Utc::now().to_rfc3339())
        .bind(session.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Session".to_string(), session.id));
        }

        Self::write_links(&mut **tx, session).await?;
        Self::fetch_one(&mut **tx, session.id).await
    }

    async fn touch_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<()> {
        let result = query("UPDATE sessions SET updated_at = updated_at WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Session".to_string(), id));
        }
        Ok(())
    }

    async fn find_slots_by_event_with_tx<'t>(
        &self,
        event_id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Vec<SessionSlot>> {
        let rows = query_as::<_, SessionSlotRow>(
            "SELECT s.id, s.name, s.date_start, s.date_end FROM sessions s
             JOIN modules m ON m.id = s.module_id
             WHERE s.event_id = ? AND s.active = 1 AND m.active = 1
             ORDER BY s.date_start, s.sequence, s.name",
        )
        .bind(event_id.to_string())
        .fetch_all(&mut **tx)
        .await
        .map_err(DbError::from)?;

        rows.into_iter().map(SessionSlotRow::into_slot).collect()
    }

    async fn find_active_by_module_with_tx<'t>(
        &self,
        module_id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Vec<Session>> {
        let sql = format!(
            "SELECT s.* FROM sessions s WHERE s.module_id = ? AND s.active = 1 {}",
            SESSION_ORDER
        );
        Self::fetch_many(&mut **tx, &sql, &[module_id.to_string()]).await
    }

    async fn reassign_event_for_module_with_tx<'t>(
        &self,
        module_id: Uuid,
        event_id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Vec<Uuid>> {
        let moved: Vec<String> = query_scalar(
            "UPDATE sessions SET event_id = ?, updated_at = ?
             WHERE module_id = ? AND event_id <> ?
             RETURNING id",
        )
        .bind(event_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(module_id.to_string())
        .bind(event_id.to_string())
        .fetch_all(&mut **tx)
        .await
        .map_err(DbError::from)?;

        moved
            .iter()
            .map(|id| parse_uuid(id, "sessions.id"))
            .collect()
    }

    async fn find_by_event(
        &self,
        event_id: Uuid,
        include_archived: bool,
        trainer_id: Option<Uuid>,
    ) -> DomainResult<Vec<Session>> {
        let sql = Self::list_query("event_id", include_archived, trainer_id);
        let mut binds = vec![event_id.to_string()];
        if let Some(user_id) = trainer_id {
            binds.push(user_id.to_string());
        }
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        Self::fetch_many(&mut conn, &sql, &binds).await
    }

    async fn find_by_module(
        &self,
        module_id: Uuid,
        include_archived: bool,
        trainer_id: Option<Uuid>,
    ) -> DomainResult<Vec<Session>> {
        let sql = Self::list_query("module_id", include_archived, trainer_id);
        let mut binds = vec![module_id.to_string()];
        if let Some(user_id) = trainer_id {
            binds.push(user_id.to_string());
        }
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        Self::fetch_many(&mut conn, &sql, &binds).await
    }

    async fn trainer_names(&self, session_id: Uuid) -> DomainResult<Vec<String>> {
        let names: Vec<String> = query_scalar(
            "SELECT u.name FROM session_trainers st
             JOIN users u ON u.id = st.user_id
             WHERE st.session_id = ?
             ORDER BY u.name",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(names)
    }
}
