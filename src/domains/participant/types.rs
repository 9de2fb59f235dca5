use crate::domains::core::repository::{parse_optional_date, parse_optional_uuid, parse_timestamp, parse_uuid};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a contact takes part in events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Student,
    Trainer,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Student => "student",
            ParticipantRole::Trainer => "trainer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(ParticipantRole::Student),
            "trainer" => Some(ParticipantRole::Trainer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParticipantRole::Student => "Student",
            ParticipantRole::Trainer => "Trainer",
        }
    }
}

/// Trainers act through an application user; students never do.
pub fn validate_role_identity(role: ParticipantRole, user_id: Option<Uuid>) -> Result<(), ValidationError> {
    match (role, user_id) {
        (ParticipantRole::Trainer, None) => Err(ValidationError::role_identity(
            "A trainer participant requires an associated user",
        )),
        (ParticipantRole::Student, Some(_)) => Err(ValidationError::role_identity(
            "A student participant cannot have an associated user",
        )),
        _ => Ok(()),
    }
}

/// Participant entity - a contact enrolled as student or trainer.
/// `name` is stored from the contact; email, phone and birthdate are read through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub role: ParticipantRole,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    pub fn merged(&self, update: &UpdateParticipant) -> Participant {
        let mut merged = self.clone();
        if let Some(contact_id) = update.contact_id {
            merged.contact_id = contact_id;
        }
        if let Some(role) = update.role {
            merged.role = role;
        }
        if let Some(user_id) = update.user_id {
            merged.user_id = user_id;
        }
        if let Some(notes) = &update.notes {
            merged.notes = notes.clone();
        }
        if let Some(active) = update.active {
            merged.active = active;
        }
        merged
    }
}

impl Validate for Participant {
    fn validate(&self) -> DomainResult<()> {
        validate_role_identity(self.role, self.user_id)?;
        Ok(())
    }
}

/// NewParticipant DTO - used when enrolling a contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParticipant {
    pub contact_id: Uuid,
    pub role: ParticipantRole,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl Validate for NewParticipant {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("contact_id", Some(self.contact_id))
            .not_nil()
            .validate()?;
        validate_role_identity(self.role, self.user_id)?;
        Ok(())
    }
}

/// UpdateParticipant DTO - `user_id: Some(None)` detaches the user
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateParticipant {
    pub contact_id: Option<Uuid>,
    pub role: Option<ParticipantRole>,
    pub user_id: Option<Option<Uuid>>,
    pub notes: Option<Option<String>>,
    pub active: Option<bool>,
}

/// ParticipantRow - participant joined with its contact
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    pub id: String,
    pub contact_id: String,
    pub role: String,
    pub user_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ParticipantRow {
    pub fn into_entity(self) -> DomainResult<Participant> {
        let role = ParticipantRole::from_str(&self.role).ok_or_else(|| {
            DomainError::Internal(format!("Invalid role '{}' in participants.role", self.role))
        })?;

        Ok(Participant {
            id: parse_uuid(&self.id, "participants.id")?,
            contact_id: parse_uuid(&self.contact_id, "participants.contact_id")?,
            role,
            user_id: parse_optional_uuid(self.user_id.as_deref(), "participants.user_id")?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            birthdate: parse_optional_date(self.birthdate.as_deref(), "contacts.birthdate")?,
            notes: self.notes,
            active: self.active,
            created_at: parse_timestamp(&self.created_at, "participants.created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "participants.updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trainer_needs_user() {
        let err = validate_role_identity(ParticipantRole::Trainer, None).unwrap_err();
        assert_eq!(err.to_string(), "A trainer participant requires an associated user");
        assert!(validate_role_identity(ParticipantRole::Trainer, Some(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn test_student_rejects_user() {
        let err = validate_role_identity(ParticipantRole::Student, Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.to_string(), "A student participant cannot have an associated user");
        assert!(validate_role_identity(ParticipantRole::Student, None).is_ok());
    }

    #[test]
    fn test_merged_record_is_checked_as_a_whole() {
        let now = Utc::now();
        let student = Participant {
            id: Uuid::new_v4(),
            contact_id: Uuid::new_v4(),
            role: ParticipantRole::Student,
            user_id: None,
            name: "Ada".to_string(),
            email: None,
            phone: None,
            birthdate: None,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        };

        // promoting without a user breaks the invariant
        let promoted = student.merged(&UpdateParticipant {
            role: Some(ParticipantRole::Trainer),
            ..Default::default()
        });
        assert!(promoted.validate().is_err());

        let with_user = student.merged(&UpdateParticipant {
            role: Some(ParticipantRole::Trainer),
            user_id: Some(Some(Uuid::new_v4())),
            ..Default::default()
        });
        assert!(with_user.validate().is_ok());
    }
}
