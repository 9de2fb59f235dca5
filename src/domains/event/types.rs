use crate::domains::core::repository::{parse_date, parse_optional_uuid, parse_timestamp, parse_uuid};
use crate::domains::schedule::duration_days;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::common::{validate_date_range, validate_title};
use crate::validation::{NestedValidator, Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of training activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    Course,
    Workshop,
    Seminar,
    Conference,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Course => "course",
            EventType::Workshop => "workshop",
            EventType::Seminar => "seminar",
            EventType::Conference => "conference",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "course" => Some(EventType::Course),
            "workshop" => Some(EventType::Workshop),
            "seminar" => Some(EventType::Seminar),
            "conference" => Some(EventType::Conference),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Course => "Course",
            EventType::Workshop => "Workshop",
            EventType::Seminar => "Seminar",
            EventType::Conference => "Conference",
        }
    }
}

/// Event lifecycle. Any state may be set directly; there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    #[default]
    Draft,
    Programmed,
    Designed,
    InProgress,
    InReview,
    Closed,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Draft => "draft",
            EventState::Programmed => "programmed",
            EventState::Designed => "designed",
            EventState::InProgress => "in_progress",
            EventState::InReview => "in_review",
            EventState::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(EventState::Draft),
            "programmed" => Some(EventState::Programmed),
            "designed" => Some(EventState::Designed),
            "in_progress" => Some(EventState::InProgress),
            "in_review" => Some(EventState::InReview),
            "closed" => Some(EventState::Closed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventState::Draft => "Draft",
            EventState::Programmed => "Programmed",
            EventState::Designed => "Designed",
            EventState::InProgress => "In Progress",
            EventState::InReview => "In Review",
            EventState::Closed => "Closed",
        }
    }

    /// Colour used when the event is drawn on a calendar.
    pub fn calendar_color(&self) -> &'static str {
        match self {
            EventState::Draft => "gray",
            EventState::Programmed => "blue",
            EventState::Designed => "light-green",
            EventState::InProgress => "green",
            EventState::InReview => "orange",
            EventState::Closed => "dark-gray",
        }
    }
}

/// Event entity - a multi-day training activity owning modules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub event_type: EventType,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub duration_days: i64,
    pub state: EventState,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_user_id: Option<Uuid>,
    pub updated_by_user_id: Option<Uuid>,
}

impl Event {
    /// Apply a partial update, producing the record that will be stored.
    /// The code is never touched and the duration follows the dates.
    pub fn merged(&self, update: &UpdateEvent) -> Event {
        let mut merged = self.clone();
        if let Some(name) = &update.name {
            merged.name = name.trim().to_string();
        }
        if let Some(event_type) = update.event_type {
            merged.event_type = event_type;
        }
        if let Some(date_start) = update.date_start {
            merged.date_start = date_start;
        }
        if let Some(date_end) = update.date_end {
            merged.date_end = date_end;
        }
        if let Some(state) = update.state {
            merged.state = state;
        }
        if let Some(notes) = &update.notes {
            merged.notes = notes.clone();
        }
        if let Some(active) = update.active {
            merged.active = active;
        }
        merged.duration_days = duration_days(Some(merged.date_start), Some(merged.date_end));
        merged
    }
}

impl Validate for Event {
    fn validate(&self) -> DomainResult<()> {
        validate_title(&self.name, "name")?;
        validate_date_range(self.date_start, self.date_end)?;
        Ok(())
    }
}

/// NewEvent DTO - used when creating a new event. The code is generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    #[serde(default)]
    pub event_type: EventType,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    #[serde(default)]
    pub state: EventState,
    pub notes: Option<String>,
}

impl Validate for NewEvent {
    fn validate(&self) -> DomainResult<()> {
        validate_title(&self.name, "name")?;
        validate_date_range(self.date_start, self.date_end)?;
        Ok(())
    }
}

/// UpdateEvent DTO - every field optional; `code` is not updatable
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub event_type: Option<EventType>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub state: Option<EventState>,
    pub notes: Option<Option<String>>,
    pub active: Option<bool>,
}

/// Live aggregates shown with an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub module_count: i64,
    pub session_count: i64,
    pub participant_count: i64,
}

/// EventResponse DTO - event plus labels and live counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub event_type: EventType,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub duration_days: i64,
    pub state: EventState,
    pub state_label: String,
    pub calendar_color: String,
    pub notes: Option<String>,
    pub active: bool,
    pub module_count: i64,
    pub session_count: i64,
    pub participant_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn from_event(event: Event, counts: EventCounts) -> Self {
        Self {
            id: event.id,
            code: event.code,
            name: event.name,
            event_type: event.event_type,
            date_start: event.date_start,
            date_end: event.date_end,
            duration_days: event.duration_days,
            state: event.state,
            state_label: event.state.label().to_string(),
            calendar_color: event.state.calendar_color().to_string(),
            notes: event.notes,
            active: event.active,
            module_count: counts.module_count,
            session_count: counts.session_count,
            participant_count: counts.participant_count,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Request to duplicate an event hierarchy under a new name and window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CloneEventRequest {
    pub source_event_id: Uuid,
    pub new_name: String,
    pub new_date_start: NaiveDate,
    pub new_date_end: NaiveDate,
}

impl CloneEventRequest {
    /// Prefilled request for `source`: same window, name suffixed with "(Copy)".
    pub fn defaults_for(source: &Event) -> Self {
        Self {
            source_event_id: source.id,
            new_name: format!("{} (Copy)", source.name),
            new_date_start: source.date_start,
            new_date_end: source.date_end,
        }
    }

    pub fn new_duration_days(&self) -> i64 {
        duration_days(Some(self.new_date_start), Some(self.new_date_end))
    }

    /// Check the request against the event being cloned.
    ///
    /// The window must not be inverted and must span at least as many days as
    /// the source. An inverted window has no duration, so only the date check
    /// reports it.
    pub fn validate_against(&self, source: &Event) -> DomainResult<()> {
        ValidationBuilder::new("new_name", Some(self.new_name.clone()))
            .not_blank()
            .max_length(255)
            .validate()?;

        let mut validator = NestedValidator::new();
        if self.new_date_end < self.new_date_start {
            validator.add_error(ValidationError::interval(
                "new_date_end",
                "The new end date must be on or after the new start date",
            ));
        }

        let new_days = self.new_duration_days();
        if new_days > 0 && new_days < source.duration_days {
            validator.add_error(ValidationError::CloneDuration {
                new_days,
                source_days: source.duration_days,
            });
        }
        validator.validate()
    }
}

/// EventRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: String,
    pub code: String,
    pub name: String,
    pub event_type: String,
    pub date_start: String,
    pub date_end: String,
    pub duration_days: i64,
    pub state: String,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_user_id: Option<String>,
    pub updated_by_user_id: Option<String>,
}

impl EventRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Event> {
        let event_type = EventType::from_str(&self.event_type).ok_or_else(|| {
            DomainError::Internal(format!("Invalid event type '{}' in events.event_type", self.event_type))
        })?;
        let state = EventState::from_str(&self.state).ok_or_else(|| {
            DomainError::Internal(format!("Invalid state '{}' in events.state", self.state))
        })?;

        Ok(Event {
            id: parse_uuid(&self.id, "events.id")?,
            code: self.code,
            name: self.name,
            event_type,
            date_start: parse_date(&self.date_start, "events.date_start")?,
            date_end: parse_date(&self.date_end, "events.date_end")?,
            duration_days: self.duration_days,
            state,
            notes: self.notes,
            active: self.active,
            created_at: parse_timestamp(&self.created_at, "events.created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "events.updated_at")?,
            created_by_user_id: parse_optional_uuid(self.created_by_user_id.as_deref(), "events.created_by_user_id")?,
            updated_by_user_id: parse_optional_uuid(self.updated_by_user_id.as_deref(), "events.updated_by_user_id")?,
        })
    }
}
