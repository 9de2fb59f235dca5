use crate::domains::core::repository::{parse_timestamp, parse_uuid};
use crate::errors::{DomainError, DomainResult};
use crate::types::UserRole;
use crate::validation::{Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Application user. Trainers assigned to sessions are users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// NewUser DTO - used when creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl Validate for NewUser {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(self.name.clone()))
            .not_blank()
            .max_length(255)
            .validate()?;

        ValidationBuilder::new("email", Some(self.email.clone()))
            .not_blank()
            .email()
            .validate()?;

        Ok(())
    }
}

/// UserRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<User> {
        let role = UserRole::from_str(&self.role).ok_or_else(|| {
            DomainError::Internal(format!("Invalid role '{}' in users.role", self.role))
        })?;

        Ok(User {
            id: parse_uuid(&self.id, "users.id")?,
            name: self.name,
            email: self.email,
            role,
            active: self.active,
            created_at: parse_timestamp(&self.created_at, "users.created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "users.updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_requires_valid_email() {
        let mut user = NewUser {
            name: "Giulia Neri".to_string(),
            email: "giulia@academy.org".to_string(),
            role: UserRole::Trainer,
        };
        assert!(user.validate().is_ok());

        user.email = "giulia".to_string();
        assert!(user.validate().is_err());
    }
}
