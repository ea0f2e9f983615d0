//! Configuration-time API for building the state graph.
//!
//! Configuration happens once, before the first trigger is fired: states are
//! linked into a hierarchy, trigger behaviors and actions are registered on
//! them, and initial transitions are declared. Structural mistakes are
//! reported as [`ConfigurationError`].

mod error;
mod state;

pub use error::ConfigurationError;
pub use state::StateConfiguration;
