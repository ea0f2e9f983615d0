//! Records describing a single transition instance.

use serde::{Deserialize, Serialize};

/// One concrete transition: where it came from, where it goes, and why.
///
/// Records are immutable values. They are handed to entry, exit and internal
/// actions and to transition listeners.
///
/// `is_reentry` is only set for explicitly reentrant transitions. A fixed
/// transition whose destination happens to equal its source is not a reentry
/// and does not exit or enter anything.
///
/// # Example
///
/// ```rust
/// use hierarch::core::Transition;
///
/// let coin = Transition::new("Locked", "Unlocked", "Coin");
/// assert!(!coin.is_reentry());
///
/// let reset = Transition::reentry("Unlocked", "Reset");
/// assert!(reset.is_reentry());
/// assert_eq!(reset.source(), reset.destination());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition<S, T> {
    source: S,
    destination: S,
    trigger: T,
    is_reentry: bool,
    is_initial: bool,
}

impl<S: Clone, T> Transition<S, T> {
    pub fn new(source: S, destination: S, trigger: T) -> Self {
        Self {
            source,
            destination,
            trigger,
            is_reentry: false,
            is_initial: false,
        }
    }

    /// A self-transition that exits and re-enters `state`.
    pub fn reentry(state: S, trigger: T) -> Self {
        Self {
            source: state.clone(),
            destination: state,
            trigger,
            is_reentry: true,
            is_initial: false,
        }
    }

    /// The automatic step from a freshly entered superstate into its
    /// initial substate. `source` is the state the firing started from.
    pub fn initial(source: S, destination: S, trigger: T) -> Self {
        Self {
            source,
            destination,
            trigger,
            is_reentry: false,
            is_initial: true,
        }
    }

    /// Same transition seen from another source, keeping its destination
    /// and trigger. Used while exiting bubbles up to a superstate.
    pub fn with_source(&self, source: S) -> Self
    where
        T: Clone,
    {
        Self {
            source,
            destination: self.destination.clone(),
            trigger: self.trigger.clone(),
            is_reentry: self.is_reentry,
            is_initial: self.is_initial,
        }
    }

    /// Same transition with another destination.
    pub fn with_destination(&self, destination: S) -> Self
    where
        T: Clone,
    {
        Self {
            source: self.source.clone(),
            destination,
            trigger: self.trigger.clone(),
            is_reentry: self.is_reentry,
            is_initial: self.is_initial,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn destination(&self) -> &S {
        &self.destination
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn is_reentry(&self) -> bool {
        self.is_reentry
    }

    pub fn is_initial(&self) -> bool {
        self.is_initial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Locked,
        Unlocked,
    }

    #[test]
    fn fixed_self_transition_is_not_reentry() {
        let transition = Transition::new(TestState::Locked, TestState::Locked, "Poke");

        assert_eq!(transition.source(), transition.destination());
        assert!(!transition.is_reentry());
    }

    #[test]
    fn reentry_targets_its_own_state() {
        let transition = Transition::reentry(TestState::Unlocked, "Reset");

        assert_eq!(transition.source(), &TestState::Unlocked);
        assert_eq!(transition.destination(), &TestState::Unlocked);
        assert!(transition.is_reentry());
        assert!(!transition.is_initial());
    }

    #[test]
    fn initial_transition_is_flagged() {
        let transition = Transition::initial(TestState::Locked, TestState::Unlocked, "Coin");

        assert!(transition.is_initial());
        assert!(!transition.is_reentry());
    }

    #[test]
    fn with_source_keeps_the_rest() {
        let transition = Transition::new(TestState::Locked, TestState::Unlocked, "Coin");
        let rewritten = transition.with_source(TestState::Unlocked);

        assert_eq!(rewritten.source(), &TestState::Unlocked);
        assert_eq!(rewritten.destination(), &TestState::Unlocked);
        assert_eq!(rewritten.trigger(), &"Coin");
        assert_eq!(transition.source(), &TestState::Locked);
    }

    #[test]
    fn transition_serializes_correctly() {
        let transition = Transition::new(TestState::Locked, TestState::Unlocked, "Coin".to_string());

        let json = serde_json::to_string(&transition).unwrap();
        let deserialized: Transition<TestState, String> = serde_json::from_str(&json).unwrap();

        assert_eq!(transition, deserialized);
    }
}
