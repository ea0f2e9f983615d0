//! Side effects and the behaviors that trigger them.
//!
//! This module holds everything the engine invokes on the caller's behalf:
//!
//! - **Actions**: entry, exit, activate, deactivate and internal callables,
//!   each either synchronous or suspension-capable
//! - **Trigger behaviors**: fixed, reentrant, internal and dynamic reactions
//!   to a trigger, each gated by a transition guard
//! - **Notifier**: listeners told about committed transitions
//! - **Unhandled policy**: what to do when nothing handles a trigger
//!
//! Suspension-capable callables return boxed futures from the `futures`
//! crate; no particular runtime is assumed.

mod action;
mod notifier;
mod trigger;
mod unhandled;

pub use action::{ActionBehavior, ActionKind, AsyncAction, Callable, Invocation, SyncAction};
pub use notifier::{AsyncListener, Listener, SyncListener, TransitionNotifier};
pub use trigger::{
    DestinationSelector, DynamicStateInfo, DynamicTransitionInfo, TriggerBehavior, TriggerKind,
};
pub use unhandled::{AsyncUnhandledAction, SyncUnhandledAction, UnhandledTriggerHandler};
