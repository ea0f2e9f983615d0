//! Trigger behaviors: what a fired trigger does in a given state.

use crate::core::{Args, InvocationInfo, State, Transition, TransitionGuard, Trigger};
use crate::effects::action::ActionBehavior;
use std::sync::Arc;

/// Computes the destination of a dynamic transition from the fire arguments.
pub type DestinationSelector<S, A> = Arc<dyn Fn(&A) -> S + Send + Sync>;

/// A destination a dynamic transition may select, as declared by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicStateInfo<S> {
    pub destination: S,
    pub criterion: String,
}

/// Descriptive metadata of a dynamic transition.
///
/// The declared destinations are advisory: the engine never checks the
/// selector's result against them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicTransitionInfo<S> {
    selector: InvocationInfo,
    possible_destinations: Vec<DynamicStateInfo<S>>,
}

impl<S> DynamicTransitionInfo<S> {
    pub fn new(selector: InvocationInfo, possible_destinations: Vec<DynamicStateInfo<S>>) -> Self {
        Self {
            selector,
            possible_destinations,
        }
    }

    pub fn selector(&self) -> &InvocationInfo {
        &self.selector
    }

    pub fn possible_destinations(&self) -> &[DynamicStateInfo<S>] {
        &self.possible_destinations
    }
}

/// The four ways a trigger can be handled.
pub enum TriggerKind<S, T, A> {
    /// Moves to a statically known state.
    Fixed { destination: S },
    /// Exits and re-enters the owning state.
    Reentrant { destination: S },
    /// Runs an action in place without leaving the state.
    Internal { action: ActionBehavior<S, T, A> },
    /// Moves to the state chosen by the selector at fire time.
    Dynamic {
        selector: DestinationSelector<S, A>,
        info: DynamicTransitionInfo<S>,
    },
}

/// A candidate reaction of a state to a trigger.
pub struct TriggerBehavior<S, T, A> {
    trigger: T,
    guard: TransitionGuard<A>,
    kind: TriggerKind<S, T, A>,
}

impl<S: State, T: Trigger, A: Args> TriggerBehavior<S, T, A> {
    pub fn fixed(trigger: T, destination: S, guard: TransitionGuard<A>) -> Self {
        Self {
            trigger,
            guard,
            kind: TriggerKind::Fixed { destination },
        }
    }

    /// `state` is the state that owns the behavior.
    pub fn reentrant(trigger: T, state: S, guard: TransitionGuard<A>) -> Self {
        Self {
            trigger,
            guard,
            kind: TriggerKind::Reentrant { destination: state },
        }
    }

    pub fn internal(trigger: T, action: ActionBehavior<S, T, A>, guard: TransitionGuard<A>) -> Self {
        Self {
            trigger,
            guard,
            kind: TriggerKind::Internal { action },
        }
    }

    pub fn dynamic(
        trigger: T,
        selector: DestinationSelector<S, A>,
        info: DynamicTransitionInfo<S>,
        guard: TransitionGuard<A>,
    ) -> Self {
        Self {
            trigger,
            guard,
            kind: TriggerKind::Dynamic { selector, info },
        }
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn guard(&self) -> &TransitionGuard<A> {
        &self.guard
    }

    pub fn kind(&self) -> &TriggerKind<S, T, A> {
        &self.kind
    }

    pub fn guard_conditions_met(&self, args: &A) -> bool {
        self.guard.guard_conditions_met(args)
    }

    pub fn unmet_guard_conditions(&self, args: &A) -> Vec<String> {
        self.guard.unmet_guard_conditions(args)
    }

    /// Where firing this behavior from `source` leads.
    ///
    /// Returns `None` for internal transitions, which never change state.
    /// Dynamic behaviors invoke their selector here.
    pub fn results_in_transition_from(&self, source: &S, args: &A) -> Option<S> {
        match &self.kind {
            TriggerKind::Fixed { destination } => Some(destination.clone()),
            TriggerKind::Reentrant { destination } => Some(destination.clone()),
            TriggerKind::Internal { .. } => {
                tracing::trace!(state = ?source, trigger = ?self.trigger, "internal transition stays in place");
                None
            }
            TriggerKind::Dynamic { selector, .. } => Some(selector(args)),
        }
    }

    /// Build the record for a transition from `source` to `destination`.
    ///
    /// A reentry inherited from a superstate keeps the real source; the
    /// destination is always the owning state.
    pub fn transition_from(&self, source: S, destination: S) -> Transition<S, T> {
        match &self.kind {
            TriggerKind::Reentrant { .. } => {
                Transition::reentry(destination, self.trigger.clone()).with_source(source)
            }
            _ => Transition::new(source, destination, self.trigger.clone()),
        }
    }

    /// The statically known destination, if any.
    pub fn destination(&self) -> Option<&S> {
        match &self.kind {
            TriggerKind::Fixed { destination } | TriggerKind::Reentrant { destination } => {
                Some(destination)
            }
            TriggerKind::Internal { .. } | TriggerKind::Dynamic { .. } => None,
        }
    }

    pub fn internal_action(&self) -> Option<&ActionBehavior<S, T, A>> {
        match &self.kind {
            TriggerKind::Internal { action } => Some(action),
            _ => None,
        }
    }

    pub fn dynamic_info(&self) -> Option<&DynamicTransitionInfo<S>> {
        match &self.kind {
            TriggerKind::Dynamic { info, .. } => Some(info),
            _ => None,
        }
    }

    pub fn is_reentrant(&self) -> bool {
        matches!(self.kind, TriggerKind::Reentrant { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.kind, TriggerKind::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Timing, DEFAULT_FUNCTION_DESCRIPTION};
    use crate::effects::action::ActionKind;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Light {
        Red,
        Green,
        Amber,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Signal {
        Next,
        Reset,
        Tick,
        Jump,
    }

    fn selector_info() -> DynamicTransitionInfo<Light> {
        DynamicTransitionInfo::new(
            InvocationInfo::new(None, Some("pick by count"), Timing::Synchronous, DEFAULT_FUNCTION_DESCRIPTION),
            vec![
                DynamicStateInfo {
                    destination: Light::Green,
                    criterion: "even".to_string(),
                },
                DynamicStateInfo {
                    destination: Light::Amber,
                    criterion: "odd".to_string(),
                },
            ],
        )
    }

    #[test]
    fn fixed_leads_to_static_destination() {
        let behavior: TriggerBehavior<Light, Signal, ()> =
            TriggerBehavior::fixed(Signal::Next, Light::Green, TransitionGuard::empty());

        assert_eq!(behavior.results_in_transition_from(&Light::Red, &()), Some(Light::Green));
        assert_eq!(behavior.destination(), Some(&Light::Green));
        assert!(!behavior.transition_from(Light::Red, Light::Green).is_reentry());
    }

    #[test]
    fn reentrant_leads_back_to_owner() {
        let behavior: TriggerBehavior<Light, Signal, ()> =
            TriggerBehavior::reentrant(Signal::Reset, Light::Red, TransitionGuard::empty());

        assert_eq!(behavior.results_in_transition_from(&Light::Red, &()), Some(Light::Red));
        assert!(behavior.is_reentrant());
        assert!(behavior.transition_from(Light::Red, Light::Red).is_reentry());
    }

    #[test]
    fn inherited_reentry_keeps_the_real_source() {
        let behavior: TriggerBehavior<Light, Signal, ()> =
            TriggerBehavior::reentrant(Signal::Reset, Light::Red, TransitionGuard::empty());

        let transition = behavior.transition_from(Light::Amber, Light::Red);

        assert!(transition.is_reentry());
        assert_eq!(transition.source(), &Light::Amber);
        assert_eq!(transition.destination(), &Light::Red);
    }

    #[test]
    fn internal_never_changes_state() {
        let action = ActionBehavior::with_transition(
            ActionKind::Internal,
            Light::Red,
            |_: &Transition<Light, Signal>, _: &()| Ok(()),
            None,
            DEFAULT_FUNCTION_DESCRIPTION,
        );
        let behavior = TriggerBehavior::internal(Signal::Tick, action, TransitionGuard::empty());

        assert_eq!(behavior.results_in_transition_from(&Light::Red, &()), None);
        assert!(behavior.internal_action().is_some());
        assert!(behavior.destination().is_none());
    }

    #[test]
    fn dynamic_asks_selector_each_time() {
        let selector: DestinationSelector<Light, u32> =
            Arc::new(|n: &u32| if n % 2 == 0 { Light::Green } else { Light::Amber });
        let behavior =
            TriggerBehavior::dynamic(Signal::Jump, selector, selector_info(), TransitionGuard::empty());

        assert_eq!(behavior.results_in_transition_from(&Light::Red, &2), Some(Light::Green));
        assert_eq!(behavior.results_in_transition_from(&Light::Red, &3), Some(Light::Amber));
        assert_eq!(behavior.dynamic_info().unwrap().possible_destinations().len(), 2);
    }

    #[test]
    fn dynamic_destination_is_not_validated() {
        let selector: DestinationSelector<Light, ()> = Arc::new(|_: &()| Light::Red);
        let behavior =
            TriggerBehavior::dynamic(Signal::Jump, selector, selector_info(), TransitionGuard::empty());

        assert_eq!(behavior.results_in_transition_from(&Light::Green, &()), Some(Light::Red));
    }

    #[test]
    fn guard_is_consulted() {
        let behavior: TriggerBehavior<Light, Signal, u32> = TriggerBehavior::fixed(
            Signal::Next,
            Light::Green,
            TransitionGuard::new(|n: &u32| *n > 5, Some("enough cars")),
        );

        assert!(behavior.guard_conditions_met(&6));
        assert_eq!(behavior.unmet_guard_conditions(&1), vec!["enough cars"]);
    }
}
