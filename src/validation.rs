use crate::errors::{ValidationError, DomainResult, DomainError};
use chrono::{NaiveDate, NaiveDateTime, SubsecRound};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

/// A trait that entities should implement for validation.
pub trait Validate {
    /// Validates the entity and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

// Common regex patterns
fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
    })
}

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[0-9 ]{6,20}$").expect("valid phone regex"))
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Collects errors from several independent checks and reports the first one.
pub struct NestedValidator {
    errors: Vec<ValidationError>,
}

impl NestedValidator {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn validate(self) -> DomainResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(DomainError::Validation(first)),
        }
    }
}

impl Default for NestedValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    /// Complete validation and return result
    pub fn validate(self) -> DomainResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(DomainError::Validation(first)),
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    /// Rejects values that are empty once trimmed.
    pub fn not_blank(mut self) -> Self {
        match &self.value {
            Some(value) if !value.trim().is_empty() => {}
            _ => self.errors.push(ValidationError::required(&self.field_name)),
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn matches_pattern(mut self, pattern: &Regex, message: &str) -> Self {
        if let Some(value) = &self.value {
            if !pattern.is_match(value) {
                self.errors.push(ValidationError::format(&self.field_name, message));
            }
        }
        self
    }

    pub fn email(self) -> Self {
        self.matches_pattern(email_regex(), "must be a valid email address")
    }

    pub fn phone(self) -> Self {
        self.matches_pattern(phone_regex(), "must be a valid phone number")
    }
}

/// UUID validation helpers
impl ValidationBuilder<Uuid> {
    pub fn not_nil(mut self) -> Self {
        if let Some(value) = &self.value {
            if *value == Uuid::nil() {
                self.errors.push(ValidationError::invalid_value(
                    &self.field_name,
                    "cannot be a nil UUID"
                ));
            }
        }
        self
    }
}

// Common validation utility module for frequently validated values
pub mod common {
    use super::*;

    /// Storage format of date-only values.
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Storage format of naive UTC date-times.
    pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Drop sub-second precision, which `DATETIME_FORMAT` cannot store.
    pub fn whole_seconds(value: NaiveDateTime) -> NaiveDateTime {
        value.trunc_subsecs(0)
    }

    /// Event-style interval: the end date may equal the start date.
    pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
        if end < start {
            return Err(ValidationError::interval(
                "date_end",
                "The end date must be on or after the start date",
            ));
        }
        Ok(())
    }

    /// Session-style interval: the end must be strictly after the start.
    pub fn validate_datetime_range(
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<(), ValidationError> {
        if end <= start {
            return Err(ValidationError::interval(
                "date_end",
                "The end time must be after the start time",
            ));
        }
        Ok(())
    }

    pub fn validate_title(value: &str, field_name: &str) -> DomainResult<()> {
        ValidationBuilder::new(field_name, Some(value.to_string()))
            .not_blank()
            .max_length(255)
            .validate()
    }

    pub fn format_datetime(value: &NaiveDateTime) -> String {
        value.format(DATETIME_FORMAT).to_string()
    }
}
