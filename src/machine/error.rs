//! Errors returned by the engine.

use crate::builder::ConfigurationError;
use std::error::Error as StdError;
use thiserror::Error;

/// Failure reported by a user action.
///
/// Actions return `Result<(), ActionError>`; the first failure aborts the
/// fire call and is handed back to its caller as [`MachineError::Action`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it reachable through `source()`.
    pub fn from_source<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type of user actions.
pub type ActionResult = Result<(), ActionError>;

/// Errors that can occur while firing triggers or activating states.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("{context}. Use the asynchronous fire path [fire_async] instead")]
    InvalidMode { context: String },

    #[error("No valid leaving transitions are permitted from state '{state}' for trigger '{trigger}'{}", format_unmet(.unmet_guards))]
    UnhandledTrigger {
        state: String,
        trigger: String,
        unmet_guards: Vec<String>,
    },

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl MachineError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_invalid_mode(&self) -> bool {
        matches!(self, Self::InvalidMode { .. })
    }

    pub fn is_unhandled_trigger(&self) -> bool {
        matches!(self, Self::UnhandledTrigger { .. })
    }
}

fn format_unmet(unmet_guards: &[String]) -> String {
    if unmet_guards.is_empty() {
        String::new()
    } else {
        format!(". Guard conditions not met: {}", unmet_guards.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("sensor offline")]
    struct SensorError;

    #[test]
    fn action_error_keeps_source() {
        let error = ActionError::from_source(SensorError);

        assert_eq!(error.message(), "sensor offline");
        assert!(error.source().is_some());
    }

    #[test]
    fn action_error_propagates_unchanged() {
        let error: MachineError = ActionError::new("bolt jammed").into();

        assert_eq!(error.to_string(), "bolt jammed");
    }

    #[test]
    fn unhandled_trigger_lists_unmet_guards() {
        let error = MachineError::UnhandledTrigger {
            state: "Locked".to_string(),
            trigger: "Push".to_string(),
            unmet_guards: vec!["has coin".to_string(), "not jammed".to_string()],
        };

        let message = error.to_string();
        assert!(message.contains("'Locked'"));
        assert!(message.contains("'Push'"));
        assert!(message.ends_with("Guard conditions not met: has coin, not jammed"));
        assert!(error.is_unhandled_trigger());
    }

    #[test]
    fn unhandled_trigger_without_guards() {
        let error = MachineError::UnhandledTrigger {
            state: "Locked".to_string(),
            trigger: "Push".to_string(),
            unmet_guards: Vec::new(),
        };

        assert!(!error.to_string().contains("Guard"));
    }

    #[test]
    fn configuration_error_converts() {
        let error: MachineError = ConfigurationError::AmbiguousTransition {
            state: "A".to_string(),
            trigger: "Go".to_string(),
        }
        .into();

        assert!(error.is_configuration());
        assert!(error.to_string().contains("mutually exclusive"));
    }
}
