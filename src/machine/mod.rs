//! The state machine engine.
//!
//! [`StateMachine`] owns the state arena, the current state and the
//! pending-trigger queue. Each fired trigger is resolved against the
//! hierarchy into a plan of steps, which is then run either synchronously or
//! by awaiting each step in turn.

mod engine;
mod error;
mod graph;
mod node;
mod options;
mod plan;
mod queue;

pub use engine::StateMachine;
pub use error::{ActionError, ActionResult, MachineError};
pub use node::{NodeId, StateNode, TriggerBehaviorResult};
pub use options::MachineOptions;
pub use queue::TriggerQueue;

pub(crate) use graph::StateGraph;
