use crate::domains::core::repository::{parse_optional_date, parse_timestamp, parse_uuid};
use crate::errors::DomainResult;
use crate::validation::{Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// External contact identity wrapped by participants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Apply a partial update, producing the record that will be stored.
    pub fn merged(&self, update: &UpdateContact) -> Contact {
        let mut merged = self.clone();
        if let Some(name) = &update.name {
            merged.name = name.trim().to_string();
        }
        if let Some(email) = &update.email {
            merged.email = email.clone();
        }
        if let Some(phone) = &update.phone {
            merged.phone = phone.clone();
        }
        if let Some(birthdate) = update.birthdate {
            merged.birthdate = birthdate;
        }
        merged
    }
}

impl Validate for Contact {
    fn validate(&self) -> DomainResult<()> {
        validate_contact_fields(&self.name, self.email.as_deref(), self.phone.as_deref())
    }
}

/// NewContact DTO - used when creating a new contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

impl Validate for NewContact {
    fn validate(&self) -> DomainResult<()> {
        validate_contact_fields(&self.name, self.email.as_deref(), self.phone.as_deref())
    }
}

/// UpdateContact DTO - `Some(None)` clears an optional field
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateContact {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub birthdate: Option<Option<NaiveDate>>,
}

fn validate_contact_fields(name: &str, email: Option<&str>, phone: Option<&str>) -> DomainResult<()> {
    ValidationBuilder::new("name", Some(name.to_string()))
        .not_blank()
        .max_length(255)
        .validate()?;

    if let Some(email) = email {
        ValidationBuilder::new("email", Some(email.to_string()))
            .email()
            .validate()?;
    }

    if let Some(phone) = phone {
        ValidationBuilder::new("phone", Some(phone.to_string()))
            .phone()
            .validate()?;
    }

    Ok(())
}

/// ContactRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct ContactRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ContactRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Contact> {
        Ok(Contact {
            id: parse_uuid(&self.id, "contacts.id")?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            birthdate: parse_optional_date(self.birthdate.as_deref(), "contacts.birthdate")?,
            created_at: parse_timestamp(&self.created_at, "contacts.created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "contacts.updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            id: Uuid::new_v4(),
            name: "Marco Bianchi".to_string(),
            email: Some("marco@example.com".to_string()),
            phone: None,
            birthdate: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let update = UpdateContact {
            name: Some(" Marco B. ".to_string()),
            phone: Some(Some("+39 333 1234567".to_string())),
            ..Default::default()
        };
        let merged = contact().merged(&update);
        assert_eq!(merged.name, "Marco B.");
        assert_eq!(merged.email.as_deref(), Some("marco@example.com"));
        assert_eq!(merged.phone.as_deref(), Some("+39 333 1234567"));
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let new_contact = NewContact {
            name: "Anna".to_string(),
            email: Some("anna-at-example".to_string()),
            phone: None,
            birthdate: None,
        };
        assert!(new_contact.validate().is_err());
    }
}
