//! Hierarch: an embeddable hierarchical state machine engine
//!
//! Hierarch tracks a current state, resolves which transition a fired trigger
//! causes and runs the entry, exit, activation and deactivation actions of
//! the states involved in a well-defined order, including for states
//! organized into a superstate/substate tree.
//!
//! # Core Concepts
//!
//! - **States and triggers**: any `Clone + Eq + Hash + Debug` values you choose
//! - **Guards**: predicates over the fire arguments gating a transition
//! - **Transitions**: fixed, reentrant, internal or dynamic
//! - **Hierarchy**: substates inherit their superstate's transitions; exits
//!   run innermost first and entries outermost first
//! - **Two execution modes**: `fire` runs synchronously and refuses
//!   suspension-capable actions, `fire_async` awaits each action in turn
//!
//! # Example
//!
//! ```rust
//! use hierarch::StateMachine;
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Gate { Locked, Unlocked }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Input { Coin, Push }
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let mut gate: StateMachine<Gate, Input> = StateMachine::new(Gate::Locked);
//!
//! let exits = Arc::clone(&log);
//! gate.configure(Gate::Locked)
//!     .permit(Input::Coin, Gate::Unlocked)
//!     .on_exit(move |_| {
//!         exits.lock().unwrap().push("exit Locked");
//!         Ok(())
//!     }, None);
//!
//! let entries = Arc::clone(&log);
//! gate.configure(Gate::Unlocked)
//!     .permit(Input::Push, Gate::Locked)
//!     .on_entry(move |_, _| {
//!         entries.lock().unwrap().push("enter Unlocked");
//!         Ok(())
//!     }, None);
//!
//! gate.on_transitioned(|t| println!("{:?} -> {:?}", t.source(), t.destination()));
//!
//! gate.fire(Input::Coin).unwrap();
//!
//! assert_eq!(gate.state(), &Gate::Unlocked);
//! assert_eq!(*log.lock().unwrap(), vec!["exit Locked", "enter Unlocked"]);
//! ```

pub mod builder;
pub mod core;
pub mod effects;
pub mod machine;

// Re-export commonly used types
pub use builder::{ConfigurationError, StateConfiguration};
pub use core::{Args, State, Transition, TransitionGuard, Trigger};
pub use effects::DynamicStateInfo;
pub use machine::{
    ActionError, ActionResult, MachineError, MachineOptions, StateMachine, TriggerQueue,
};
