//! Headless view controllers.
//!
//! These hold the state a screen renders (items, loading flags, pending
//! prompts) and turn user events into gateway calls. Rendering and
//! navigation belong to the front end; controllers only report what should
//! be shown or where to go next.

pub mod form;
pub mod list;

pub use form::{AppointmentForm, FormMode, FormOutcome, PendingWrite};
pub use list::{AppointmentList, DeletePrompt, RefreshTicket};

use crate::error::AgendaError;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
const SUCCESS_TITLE: &str = "Success";

/// Message for the user. Every failure ends the action that triggered it;
/// nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(SUCCESS_TITLE, message)
    }

    pub fn is_success(&self) -> bool {
        self.title == SUCCESS_TITLE
    }

    /// User mistakes are shown as-is. Backend failures are logged with
    /// detail and shown generically.
    pub fn from_error(err: &AgendaError) -> Self {
        match err {
            AgendaError::Validation(_) => Self::new("Please fill in all fields", err.to_string()),
            _ if err.is_user_error() => Self::new("Error", err.to_string()),
            _ => {
                tracing::error!(error = %err, "operation failed");
                Self::new("Error", GENERIC_FAILURE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[test]
    fn test_backend_failures_hide_detail() {
        let alert = Alert::from_error(&AgendaError::Store("disk on fire".into()));
        assert_eq!(alert.message, GENERIC_FAILURE);
    }

    #[test]
    fn test_validation_failures_name_fields() {
        let alert = Alert::from_error(&AgendaError::Validation(vec![FieldError::required(
            "clientName",
        )]));
        assert!(alert.message.contains("clientName is required"));
    }
}
