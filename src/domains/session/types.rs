use crate::domains::core::repository::{parse_datetime, parse_timestamp, parse_uuid};
use crate::domains::schedule::{duration_hours, ScheduledBlock};
use crate::errors::{DomainError, DomainResult};
use crate::validation::common::{validate_datetime_range, validate_title, whole_seconds};
use crate::validation::Validate;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domains::module::types::DEFAULT_SEQUENCE;

fn default_sequence() -> i64 {
    DEFAULT_SEQUENCE
}

/// Session lifecycle. Freely settable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idea,
    Designed,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idea => "idea",
            SessionState::Designed => "designed",
            SessionState::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idea" => Some(SessionState::Idea),
            "designed" => Some(SessionState::Designed),
            "closed" => Some(SessionState::Closed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idea => "Idea",
            SessionState::Designed => "Designed",
            SessionState::Closed => "Closed",
        }
    }
}

/// Session entity - one scheduled block of a module.
/// `event_id` mirrors the owning module's event and is never written directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub module_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub date_start: NaiveDateTime,
    pub date_end: NaiveDateTime,
    pub duration_hours: f64,
    pub state: SessionState,
    pub description: Option<String>,
    pub materials: Option<String>,
    pub notes: Option<String>,
    pub sequence: i64,
    pub active: bool,
    pub trainer_ids: Vec<Uuid>,
    pub attachment_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Apply a partial update. Duration follows the new times;
    /// `event_id` is refreshed by the caller from the target module.
    pub fn merged(&self, update: &UpdateSession) -> Session {
        let mut merged = self.clone();
        if let Some(module_id) = update.module_id {
            merged.module_id = module_id;
        }
        if let Some(name) = &update.name {
            merged.name = name.trim().to_string();
        }
        if let Some(date_start) = update.date_start {
            merged.date_start = whole_seconds(date_start);
        }
        if let Some(date_end) = update.date_end {
            merged.date_end = whole_seconds(date_end);
        }
        if let Some(state) = update.state {
            merged.state = state;
        }
        if let Some(description) = &update.description {
            merged.description = description.clone();
        }
        if let Some(materials) = &update.materials {
            merged.materials = materials.clone();
        }
        if let Some(notes) = &update.notes {
            merged.notes = notes.clone();
        }
        if let Some(sequence) = update.sequence {
            merged.sequence = sequence;
        }
        if let Some(active) = update.active {
            merged.active = active;
        }
        if let Some(trainer_ids) = &update.trainer_ids {
            merged.trainer_ids = dedup(trainer_ids);
        }
        if let Some(attachment_ids) = &update.attachment_ids {
            merged.attachment_ids = dedup(attachment_ids);
        }
        merged.duration_hours = duration_hours(Some(merged.date_start), Some(merged.date_end));
        merged
    }

    /// Whether the times or the owner changed between two versions.
    pub fn schedule_changed(&self, other: &Session) -> bool {
        self.date_start != other.date_start
            || self.date_end != other.date_end
            || self.event_id != other.event_id
            || self.active != other.active
    }
}

impl Validate for Session {
    fn validate(&self) -> DomainResult<()> {
        validate_title(&self.name, "name")?;
        validate_datetime_range(self.date_start, self.date_end)?;
        Ok(())
    }
}

impl ScheduledBlock for Session {
    fn block_id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn starts_at(&self) -> Option<NaiveDateTime> {
        Some(self.date_start)
    }

    fn ends_at(&self) -> Option<NaiveDateTime> {
        Some(self.date_end)
    }

    fn duration_hours(&self) -> f64 {
        self.duration_hours
    }
}

/// NewSession DTO - used when scheduling a session inside a module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub module_id: Uuid,
    pub name: String,
    pub date_start: NaiveDateTime,
    pub date_end: NaiveDateTime,
    pub description: Option<String>,
    pub materials: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub state: SessionState,
    #[serde(default = "default_sequence")]
    pub sequence: i64,
    #[serde(default)]
    pub trainer_ids: Vec<Uuid>,
    #[serde(default)]
    pub attachment_ids: Vec<Uuid>,
}

impl Validate for NewSession {
    fn validate(&self) -> DomainResult<()> {
        validate_title(&self.name, "name")?;
        // checked as stored
        validate_datetime_range(whole_seconds(self.date_start), whole_seconds(self.date_end))?;
        Ok(())
    }
}

impl NewSession {
    /// Build the entity for `event_id`, the event owning the target module.
    pub fn into_session(self, event_id: Uuid) -> Session {
        let now = Utc::now();
        let (date_start, date_end) = (whole_seconds(self.date_start), whole_seconds(self.date_end));
        Session {
            id: Uuid::new_v4(),
            module_id: self.module_id,
            event_id,
            name: self.name.trim().to_string(),
            date_start,
            date_end,
            duration_hours: duration_hours(Some(date_start), Some(date_end)),
            state: self.state,
            description: self.description,
            materials: self.materials,
            notes: self.notes,
            sequence: self.sequence,
            active: true,
            trainer_ids: dedup(&self.trainer_ids),
            attachment_ids: dedup(&self.attachment_ids),
            created_at: now,
            updated_at: now,
        }
    }
}

/// UpdateSession DTO - link lists replace the current sets when given
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSession {
    pub module_id: Option<Uuid>,
    pub name: Option<String>,
    pub date_start: Option<NaiveDateTime>,
    pub date_end: Option<NaiveDateTime>,
    pub state: Option<SessionState>,
    pub description: Option<Option<String>>,
    pub materials: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub sequence: Option<i64>,
    pub active: Option<bool>,
    pub trainer_ids: Option<Vec<Uuid>>,
    pub attachment_ids: Option<Vec<Uuid>>,
}

/// Minimal projection of a session used by the overlap scan
#[derive(Debug, Clone, FromRow)]
pub struct SessionSlotRow {
    pub id: String,
    pub name: String,
    pub date_start: String,
    pub date_end: String,
}

#[derive(Debug, Clone)]
pub struct SessionSlot {
    pub id: Uuid,
    pub name: String,
    pub date_start: NaiveDateTime,
    pub date_end: NaiveDateTime,
}

impl SessionSlotRow {
    pub fn into_slot(self) -> DomainResult<SessionSlot> {
        Ok(SessionSlot {
            id: parse_uuid(&self.id, "sessions.id")?,
            name: self.name,
            date_start: parse_datetime(&self.date_start, "sessions.date_start")?,
            date_end: parse_datetime(&self.date_end, "sessions.date_end")?,
        })
    }
}

impl ScheduledBlock for SessionSlot {
    fn block_id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn starts_at(&self) -> Option<NaiveDateTime> {
        Some(self.date_start)
    }

    fn ends_at(&self) -> Option<NaiveDateTime> {
        Some(self.date_end)
    }
}

/// SessionRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: String,
    pub module_id: String,
    pub event_id: String,
    pub name: String,
    pub date_start: String,
    pub date_end: String,
    pub duration_hours: f64,
    pub state: String,
    pub description: Option<String>,
    pub materials: Option<String>,
    pub notes: Option<String>,
    pub sequence: i64,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl SessionRow {
    /// Convert database row to domain entity; link ids are loaded separately.
    pub fn into_entity(self, trainer_ids: Vec<Uuid>, attachment_ids: Vec<Uuid>) -> DomainResult<Session> {
        let state = SessionState::from_str(&self.state).ok_or_else(|| {
            DomainError::Internal(format!("Invalid state '{}' in sessions.state", self.state))
        })?;

        Ok(Session {
            id: parse_uuid(&self.id, "sessions.id")?,
            module_id: parse_uuid(&self.module_id, "sessions.module_id")?,
            event_id: parse_uuid(&self.event_id, "sessions.event_id")?,
            name: self.name,
            date_start: parse_datetime(&self.date_start, "sessions.date_start")?,
            date_end: parse_datetime(&self.date_end, "sessions.date_end")?,
            duration_hours: self.duration_hours,
            state,
            description: self.description,
            materials: self.materials,
            notes: self.notes,
            sequence: self.sequence,
            active: self.active,
            trainer_ids,
            attachment_ids,
            created_at: parse_timestamp(&self.created_at, "sessions.created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "sessions.updated_at")?,
        })
    }
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn new_session() -> NewSession {
        NewSession {
            module_id: Uuid::new_v4(),
            name: "Welcome".to_string(),
            date_start: at(9, 0),
            date_end: at(10, 30),
            description: None,
            materials: None,
            notes: None,
            state: SessionState::Idea,
            sequence: 10,
            trainer_ids: Vec::new(),
            attachment_ids: Vec::new(),
        }
    }

    #[test]
    fn test_end_must_follow_start() {
        let mut session = new_session();
        assert!(session.validate().is_ok());

        session.date_end = session.date_start;
        assert!(session.validate().is_err());
    }

    #[test]
    fn test_into_session_computes_duration_and_dedups_links() {
        let trainer = Uuid::new_v4();
        let mut input = new_session();
        input.trainer_ids = vec![trainer, trainer];
        let event_id = Uuid::new_v4();

        let session = input.into_session(event_id);
        assert_eq!(session.duration_hours, 1.5);
        assert_eq!(session.event_id, event_id);
        assert_eq!(session.trainer_ids, vec![trainer]);
        assert!(session.active);
    }

    #[test]
    fn test_merge_detects_schedule_change() {
        let session = new_session().into_session(Uuid::new_v4());

        let renamed = session.merged(&UpdateSession {
            name: Some("Welcome coffee".to_string()),
            ..Default::default()
        });
        assert!(!session.schedule_changed(&renamed));

        let moved = session.merged(&UpdateSession {
            date_end: Some(at(11, 0)),
            ..Default::default()
        });
        assert!(session.schedule_changed(&moved));
        assert_eq!(moved.duration_hours, 2.0);
    }

    #[test]
    fn test_sub_second_times_are_dropped_before_checks() {
        let half_second = chrono::Duration::milliseconds(500);

        let mut input = new_session();
        input.date_start = at(12, 0) + chrono::Duration::milliseconds(100);
        input.date_end = at(12, 0) + chrono::Duration::milliseconds(900);
        assert!(input.validate().is_err());

        input.date_end = at(10, 30) + half_second;
        let session = input.into_session(Uuid::new_v4());
        assert_eq!(session.date_end, at(10, 30));
        assert_eq!(session.duration_hours, 1.5);

        let moved = session.merged(&UpdateSession {
            date_start: Some(at(10, 30) - half_second),
            ..Default::default()
        });
        assert_eq!(moved.date_start, at(10, 29) + chrono::Duration::seconds(59));
    }
}
