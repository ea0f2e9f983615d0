//! Identity traits for states, triggers and call arguments.
//!
//! States and triggers are opaque to the engine: it only ever compares,
//! hashes, clones and prints them. Any type meeting the bounds qualifies
//! through the blanket implementations below.

use std::fmt::Debug;
use std::hash::Hash;

/// Identity of a state in the machine.
///
/// # Required Traits
///
/// - `Clone`: identities are copied into transition records
/// - `Eq` + `Hash`: identities key the state arena
/// - `Debug`: identities are rendered into error messages
/// - `Send` + `Sync`: machines and their futures may move across threads
///
/// # Example
///
/// ```rust
/// use hierarch::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn assert_state<S: State>(_: &S) {}
/// assert_state(&Door::Open);
/// assert_state(&"any string works too");
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<S> State for S where S: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Identity of a trigger (event) that may cause a transition.
///
/// Same bounds as [`State`]; the two are kept apart so signatures read
/// unambiguously.
pub trait Trigger: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Trigger for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Arguments supplied when a trigger is fired.
///
/// Guards, dynamic destination selectors and entry/internal actions all see
/// the same value. Machines that need no arguments use `()`.
pub trait Args: Clone + Send + Sync + 'static {}

impl<A> Args for A where A: Clone + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    fn requires_state<S: State>(state: S) -> S {
        state
    }

    fn requires_trigger<T: Trigger>(trigger: T) -> T {
        trigger
    }

    fn requires_args<A: Args>(args: A) -> A {
        args
    }

    #[test]
    fn enums_are_states() {
        let state = requires_state(TestState::Processing);
        assert_eq!(state, TestState::Processing);
    }

    #[test]
    fn primitives_are_identities() {
        assert_eq!(requires_state(7u32), 7);
        assert_eq!(requires_trigger("coin"), "coin");
        assert_eq!(requires_trigger(String::from("push")), "push");
    }

    #[test]
    fn unit_and_tuples_are_args() {
        requires_args(());
        assert_eq!(requires_args((1, "two")), (1, "two"));
    }

    #[test]
    fn states_hash_by_identity() {
        let mut seen = HashSet::new();
        assert!(seen.insert(TestState::Initial));
        assert!(seen.insert(TestState::Complete));
        assert!(!seen.insert(TestState::Initial));
    }

    #[test]
    fn debug_form_names_the_state() {
        assert_eq!(format!("{:?}", TestState::Initial), "Initial");
    }
}
