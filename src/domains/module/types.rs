use crate::domains::core::repository::{parse_timestamp, parse_uuid};
use crate::errors::DomainResult;
use crate::validation::common::validate_title;
use crate::validation::{Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_SEQUENCE: i64 = 10;

fn default_sequence() -> i64 {
    DEFAULT_SEQUENCE
}

/// Module entity - a thematic block of an event, owning sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub sequence: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Module {
    pub fn merged(&self, update: &UpdateModule) -> Module {
        let mut merged = self.clone();
        if let Some(event_id) = update.event_id {
            merged.event_id = event_id;
        }
        if let Some(name) = &update.name {
            merged.name = name.trim().to_string();
        }
        if let Some(description) = &update.description {
            merged.description = description.clone();
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
        merged
    }
}

impl Validate for Module {
    fn validate(&self) -> DomainResult<()> {
        validate_title(&self.name, "name")?;
        ValidationBuilder::new("event_id", Some(self.event_id)).not_nil().validate()?;
        Ok(())
    }
}

/// NewModule DTO - used when creating a module inside an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewModule {
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[serde(default = "default_sequence")]
    pub sequence: i64,
}

impl Validate for NewModule {
    fn validate(&self) -> DomainResult<()> {
        validate_title(&self.name, "name")?;
        ValidationBuilder::new("event_id", Some(self.event_id)).not_nil().validate()?;
        Ok(())
    }
}

/// UpdateModule DTO - `event_id` moves the module (and its sessions) to another event
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateModule {
    pub event_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub sequence: Option<i64>,
    pub active: Option<bool>,
}

/// ModuleResponse DTO - module with its live session count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub sequence: i64,
    pub active: bool,
    pub session_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModuleResponse {
    pub fn from_module(module: Module, session_count: i64) -> Self {
        Self {
            id: module.id,
            event_id: module.event_id,
            name: module.name,
            description: module.description,
            notes: module.notes,
            sequence: module.sequence,
            active: module.active,
            session_count,
            created_at: module.created_at,
            updated_at: module.updated_at,
        }
    }
}

/// ModuleRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct ModuleRow {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub sequence: i64,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ModuleRow {
    pub fn into_entity(self) -> DomainResult<Module> {
        Ok(Module {
            id: parse_uuid(&self.id, "modules.id")?,
            event_id: parse_uuid(&self.event_id, "modules.event_id")?,
            name: self.name,
            description: self.description,
            notes: self.notes,
            sequence: self.sequence,
            active: self.active,
            created_at: parse_timestamp(&self.created_at, "modules.created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "modules.updated_at")?,
        })
    }
}
