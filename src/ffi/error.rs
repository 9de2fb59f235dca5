use std::fmt;
use serde::{Deserialize, Serialize};
use crate::errors::{DomainError, DbError, ServiceError, ValidationError};

/// Error codes for FFI boundary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Success (no error)
    Success = 0,

    // General errors (1-99)
    Unknown = 1,
    InvalidArgument = 2,
    NullPointer = 3,
    InvalidUtf8 = 4,
    InvalidUuid = 5,
    InternalError = 6,
    NotInitialized = 7,

    // Store integrity errors (100-199)
    DatabaseGeneral = 100,
    DatabaseNotFound = 101,
    UniqueViolation = 102,
    DatabaseLocked = 103,
    DatabaseConnection = 104,
    DatabaseTransaction = 105,
    DatabaseMigration = 106,
    ForeignKeyViolation = 107,

    // Domain errors (200-299)
    DomainGeneral = 200,
    EntityNotFound = 201,
    AuthorizationFailed = 202,
    ValidationFailed = 204,
    ReportError = 207,
    IntervalInvalid = 210,
    ScheduleOverlap = 211,
    CloneDurationTooShort = 212,
    RoleIdentityInvalid = 213,

    // Service errors (300-399)
    ServiceGeneral = 300,
    PermissionDenied = 305,
    ConfigurationError = 310,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as i32)
    }
}

/// Error type for FFI boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FFIError {
    /// Error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (JSON string)
    pub details: Option<String>,
}

impl fmt::Display for FFIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for FFIError {}

impl FFIError {
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: &str, details: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: Some(details.to_string()),
        }
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn null_pointer(argument: &str) -> Self {
        Self::new(ErrorCode::NullPointer, &format!("Null pointer provided for '{}'", argument))
    }

    pub fn internal(message: String) -> Self {
        Self::new(ErrorCode::InternalError, &message)
    }

    pub fn not_initialized(component: &str) -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            &format!("{} not initialized; call training_initialize first", component),
        )
    }
}

/// Result type for FFI operations
pub type FFIResult<T> = Result<T, FFIError>;

fn details_json(value: serde_json::Value) -> String {
    value.to_string()
}

impl From<DbError> for FFIError {
    fn from(err: DbError) -> Self {
        let message = err.to_string();
        match err {
            DbError::UniqueViolation(_) => Self::new(ErrorCode::UniqueViolation, &message),
            DbError::ForeignKeyViolation(_) => Self::new(ErrorCode::ForeignKeyViolation, &message),
            DbError::NotFound(entity, id) => Self::with_details(
                ErrorCode::DatabaseNotFound,
                &message,
                &details_json(serde_json::json!({ "entity": entity, "id": id })),
            ),
            DbError::Locked => Self::new(ErrorCode::DatabaseLocked, &message),
            DbError::ConnectionPool(_) => Self::new(ErrorCode::DatabaseConnection, &message),
            DbError::Transaction(_) => Self::new(ErrorCode::DatabaseTransaction, &message),
            DbError::Migration(_) => Self::new(ErrorCode::DatabaseMigration, &message),
            DbError::Query(_) | DbError::Other(_) => Self::new(ErrorCode::DatabaseGeneral, &message),
        }
    }
}

impl From<ValidationError> for FFIError {
    fn from(err: ValidationError) -> Self {
        let message = err.to_string();
        match &err {
            ValidationError::Interval { field, .. } => Self::with_details(
                ErrorCode::IntervalInvalid,
                &message,
                &details_json(serde_json::json!({ "field": field, "type": "interval" })),
            ),
            ValidationError::Overlap { session, start, end } => Self::with_details(
                ErrorCode::ScheduleOverlap,
                &message,
                &details_json(serde_json::json!({
                    "session": session,
                    "start": start,
                    "end": end,
                })),
            ),
            ValidationError::CloneDuration { new_days, source_days } => Self::with_details(
                ErrorCode::CloneDurationTooShort,
                &message,
                &details_json(serde_json::json!({
                    "new_days": new_days,
                    "source_days": source_days,
                })),
            ),
            ValidationError::RoleIdentity(_) => Self::new(ErrorCode::RoleIdentityInvalid, &message),
            ValidationError::Required { field } => Self::with_details(
                ErrorCode::ValidationFailed,
                &message,
                &details_json(serde_json::json!({ "field": field, "type": "required" })),
            ),
            ValidationError::MaxLength { field, max } => Self::with_details(
                ErrorCode::ValidationFailed,
                &message,
                &details_json(serde_json::json!({ "field": field, "type": "max_length", "max": max })),
            ),
            ValidationError::Format { field, reason } | ValidationError::InvalidValue { field, reason } => {
                Self::with_details(
                    ErrorCode::ValidationFailed,
                    &message,
                    &details_json(serde_json::json!({ "field": field, "reason": reason })),
                )
            }
            ValidationError::Relationship(_) => {
                Self::new(ErrorCode::ValidationFailed, &message)
            }
        }
    }
}

impl From<DomainError> for FFIError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Database(db_err) => db_err.into(),
            DomainError::Validation(validation_err) => validation_err.into(),
            DomainError::EntityNotFound(entity, id) => Self::with_details(
                ErrorCode::EntityNotFound,
                &format!("{} with ID {} not found", entity, id),
                &details_json(serde_json::json!({ "entity": entity, "id": id.to_string() })),
            ),
            DomainError::AuthorizationFailed(msg) => Self::new(ErrorCode::AuthorizationFailed, &msg),
            DomainError::Report(msg) => Self::new(ErrorCode::ReportError, &msg),
            DomainError::Internal(msg) => Self::new(ErrorCode::InternalError, &msg),
        }
    }
}

impl From<ServiceError> for FFIError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(domain_err) => domain_err.into(),
            ServiceError::PermissionDenied(msg) => Self::new(ErrorCode::PermissionDenied, &msg),
            ServiceError::Configuration(msg) => Self::new(ErrorCode::ConfigurationError, &msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validation_and_integrity_codes_differ() {
        let overlap: FFIError = ServiceError::from(ValidationError::Overlap {
            session: "Intro".to_string(),
            start: "2025-06-02 09:00:00".to_string(),
            end: "2025-06-02 10:00:00".to_string(),
        })
        .into();
        assert_eq!(overlap.code, ErrorCode::ScheduleOverlap);
        assert!(overlap.details.as_deref().unwrap_or("").contains("Intro"));

        let unique: FFIError = ServiceError::from(DbError::UniqueViolation("participants".to_string())).into();
        assert_eq!(unique.code, ErrorCode::UniqueViolation);
        assert_ne!(overlap.code as i32, unique.code as i32);
    }

    #[test]
    fn test_service_errors_map_to_stable_codes() {
        let denied: FFIError = ServiceError::PermissionDenied("nope".to_string()).into();
        assert_eq!(denied.code as i32, 305);

        let missing: FFIError = DomainError::EntityNotFound("Event".to_string(), Uuid::nil()).into();
        assert_eq!(missing.code, ErrorCode::EntityNotFound);

        let clone: FFIError = ValidationError::CloneDuration { new_days: 1, source_days: 3 }.into();
        assert_eq!(clone.code, ErrorCode::CloneDurationTooShort);
    }
}
