//! Configuration errors raised while building or resolving the state graph.

use thiserror::Error;

/// Errors caused by an inconsistent machine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error(
        "Multiple permitted transitions are configured from state '{state}' for trigger '{trigger}'. \
         Guard clauses must be mutually exclusive"
    )]
    AmbiguousTransition { state: String, trigger: String },

    #[error("State '{state}' cannot be a substate of '{superstate}': it would create a cycle")]
    SuperstateCycle { state: String, superstate: String },

    #[error("State '{state}' is already a substate of '{existing}', cannot also be a substate of '{requested}'")]
    SuperstateAlreadySet {
        state: String,
        existing: String,
        requested: String,
    },

    #[error("State '{state}' already has an initial transition to '{existing}'")]
    MultipleInitialTransitions { state: String, existing: String },

    #[error("The target '{target}' of the initial transition of state '{state}' is not one of its substates")]
    InitialTransitionNotSubstate { state: String, target: String },
}
