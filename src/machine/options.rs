//! Per-machine settings.

use crate::core::DEFAULT_FUNCTION_DESCRIPTION;
use serde::{Deserialize, Serialize};

/// Settings fixed when a machine is constructed.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Description given to closures and other compiler-generated callables
    /// registered without one.
    pub default_function_description: String,
    /// Drop pending queued triggers when a fire call fails.
    pub clear_queue_on_error: bool,
}

impl MachineOptions {
    pub fn with_default_function_description(mut self, description: impl Into<String>) -> Self {
        self.default_function_description = description.into();
        self
    }

    pub fn with_clear_queue_on_error(mut self, clear: bool) -> Self {
        self.clear_queue_on_error = clear;
        self
    }
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            default_function_description: DEFAULT_FUNCTION_DESCRIPTION.to_string(),
            clear_queue_on_error: true,
        }
    }
}
