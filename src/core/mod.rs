//! Core value types of the engine.
//!
//! This module contains the pieces with no execution semantics of their own:
//! - Identity traits for states, triggers and call arguments
//! - Transition records
//! - Transition guards
//! - Descriptions of user callables
//!
//! Everything here is pure; side effects live in [`crate::effects`] and are
//! driven by [`crate::machine`].

mod guard;
mod invocation;
mod state;
mod transition;

pub use guard::{GuardCondition, TransitionGuard};
pub use invocation::{InvocationInfo, Timing, DEFAULT_FUNCTION_DESCRIPTION};
pub use state::{Args, State, Trigger};
pub use transition::Transition;
