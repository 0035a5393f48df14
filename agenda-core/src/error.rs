//! Error types for the agenda ecosystem.

use std::fmt;

use thiserror::Error;

/// A single failed field check, reported back to the form that submitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, "is required")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Errors that can occur in agenda operations.
#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Invalid input: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("No user is signed in")]
    NotAuthenticated,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Access denied to '{0}'")]
    AccessDenied(String),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("No profile stored for user {0}")]
    ProfileNotFound(String),

    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AgendaError {
    /// Shorthand for a validation error carrying one field.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AgendaError::Validation(vec![FieldError::new(field, message)])
    }

    /// True for errors caused by what the user typed, as opposed to the backend.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AgendaError::Validation(_)
                | AgendaError::NotAuthenticated
                | AgendaError::InvalidCredentials
                | AgendaError::EmailTaken(_)
        )
    }
}

impl From<serde_json::Error> for AgendaError {
    fn from(err: serde_json::Error) -> Self {
        AgendaError::Serialization(err.to_string())
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for agenda operations.
pub type AgendaResult<T> = Result<T, AgendaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = AgendaError::Validation(vec![
            FieldError::required("clientName"),
            FieldError::new("time", "must be one of 09:00, 10:00"),
        ]);

        assert_eq!(
            err.to_string(),
            "Invalid input: clientName is required, time must be one of 09:00, 10:00"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn test_store_errors_are_not_user_errors() {
        assert!(!AgendaError::Store("disk full".into()).is_user_error());
        assert!(!AgendaError::AccessDenied("accounts".into()).is_user_error());
    }
}
