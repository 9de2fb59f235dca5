use crate::domains::core::repository::{finish_tx, FindById, HardDeletable};
use crate::domains::participant::types::{NewParticipant, Participant, ParticipantRole, ParticipantRow};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Participant columns with the contact fields read through the link.
const PARTICIPANT_SELECT: &str = "SELECT p.id, p.contact_id, p.role, p.user_id, p.name,
        c.email, c.phone, c.birthdate, p.notes, p.active, p.created_at, p.updated_at
     FROM participants p
     JOIN contacts c ON c.id = p.contact_id";

/// Trait defining participant repository operations
#[async_trait]
pub trait ParticipantRepository: FindById<Participant> + HardDeletable + Send + Sync {
    /// Insert a participant; the stored name is copied from its contact.
    async fn create(&self, new_participant: &NewParticipant) -> DomainResult<Participant>;

    async fn update(&self, participant: &Participant) -> DomainResult<Participant>;

    /// Participants ordered by name, optionally restricted to one role.
    async fn find_all(
        &self,
        role: Option<ParticipantRole>,
        include_archived: bool,
    ) -> DomainResult<Vec<Participant>>;

    /// Active participants enrolled in an event, ordered by name.
    async fn find_by_event(&self, event_id: Uuid) -> DomainResult<Vec<Participant>>;
}

/// SQLite implementation for ParticipantRepository
#[derive(Debug, Clone)]
pub struct SqliteParticipantRepository {
    pool: SqlitePool,
}

impl SqliteParticipantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_rows(rows: Vec<ParticipantRow>) -> DomainResult<Vec<Participant>> {
        rows.into_iter().map(ParticipantRow::into_entity).collect()
    }
}

#[async_trait]
impl FindById<Participant> for SqliteParticipantRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Participant> {
        let sql = format!("{} WHERE p.id = ?", PARTICIPANT_SELECT);
        let row = query_as::<_, ParticipantRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Participant".to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl HardDeletable for SqliteParticipantRepository {
    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let result = query("DELETE FROM participants WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Participant".to_string(), id))
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
impl ParticipantRepository for SqliteParticipantRepository {
    async fn create(&self, new_participant: &NewParticipant) -> DomainResult<Participant> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        let result = query(
            "INSERT INTO participants (id, contact_id, role, user_id, name, notes, active, created_at, updated_at)
             SELECT ?, c.id, ?, ?, c.name, ?, 1, ?, ?
             FROM contacts c WHERE c.id = ?",
        )
        .bind(id.to_string())
        .bind(new_participant.role.as_str())
        .bind(new_participant.user_id.map(|u| u.to_string()))
        .bind(&new_participant.notes)
        .bind(&now)
        .bind(&now)
        .bind(new_participant.contact_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound(
                "Contact".to_string(),
                new_participant.contact_id,
            ));
        }

        self.find_by_id(id).await
    }

    async fn update(&self, participant: &Participant) -> DomainResult<Participant> {
        let result = query(
            "UPDATE participants SET
                contact_id = ?, role = ?, user_id = ?, notes = ?, active = ?, updated_at = ?,
                name = COALESCE((SELECT name FROM contacts WHERE id = ?), name)
             WHERE id = ?",
        )
        .bind(participant.contact_id.to_string())
        .bind(participant.role.as_str())
        .bind(participant.user_id.map(|u| u.to_string()))
        .bind(&participant.notes)
        .bind(participant.active)
        .bind(Utc::now().to_rfc3339())
        .bind(participant.contact_id.to_string())
        .bind(participant.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Participant".to_string(), participant.id));
        }

        self.find_by_id(participant.id).await
    }

    async fn find_all(
        &self,
        role: Option<ParticipantRole>,
        include_archived: bool,
    ) -> DomainResult<Vec<Participant>> {
        let mut conditions: Vec<&str> = Vec::new();
        if !include_archived {
            conditions.push("p.active = 1");
        }
        if role.is_some() {
            conditions.push("p.role = ?");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("{} {} ORDER BY p.name, p.id", PARTICIPANT_SELECT, where_clause);
        let mut select_query = query_as::<_, ParticipantRow>(&sql);
        if let Some(role) = role {
            select_query = select_query.bind(role.as_str());
        }
        let rows = select_query
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        Self::map_rows(rows)
    }

    async fn find_by_event(&self, event_id: Uuid) -> DomainResult<Vec<Participant>> {
        let sql = format!(
            "{} JOIN event_participants ep ON ep.participant_id = p.id
             WHERE ep.event_id = ? AND p.active = 1
             ORDER BY p.name, p.id",
            PARTICIPANT_SELECT
        );
        let rows = query_as::<_, ParticipantRow>(&sql)
            .bind(event_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        Self::map_rows(rows)
    }
}
