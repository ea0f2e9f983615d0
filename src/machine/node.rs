//! Per-state representation.

use crate::builder::ConfigurationError;
use crate::core::{Args, State, Trigger};
use crate::effects::{ActionBehavior, ActionKind, TriggerBehavior};
use indexmap::IndexMap;
use tracing::debug;

/// Index of a node in the machine's state arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// A candidate behavior together with the guard conditions it failed.
pub struct TriggerBehaviorResult<'a, S, T, A> {
    behavior: &'a TriggerBehavior<S, T, A>,
    unmet_guards: Vec<String>,
}

impl<'a, S, T, A> TriggerBehaviorResult<'a, S, T, A> {
    pub fn behavior(&self) -> &'a TriggerBehavior<S, T, A> {
        self.behavior
    }

    pub fn unmet_guards(&self) -> &[String] {
        &self.unmet_guards
    }

    /// True when every guard of the behavior held.
    pub fn is_satisfied(&self) -> bool {
        self.unmet_guards.is_empty()
    }

    pub fn into_unmet_guards(self) -> Vec<String> {
        self.unmet_guards
    }
}

/// One configured state: its actions, trigger behaviors and place in the
/// hierarchy.
///
/// Superstate and substates are arena indices into the owning machine.
/// Everything except the activation flag is fixed once firing begins.
pub struct StateNode<S, T, A> {
    state: S,
    entry_actions: Vec<ActionBehavior<S, T, A>>,
    exit_actions: Vec<ActionBehavior<S, T, A>>,
    activate_actions: Vec<ActionBehavior<S, T, A>>,
    deactivate_actions: Vec<ActionBehavior<S, T, A>>,
    trigger_behaviors: IndexMap<T, Vec<TriggerBehavior<S, T, A>>>,
    superstate: Option<NodeId>,
    substates: Vec<NodeId>,
    active: bool,
    initial_transition: Option<S>,
}

impl<S: State, T: Trigger, A: Args> StateNode<S, T, A> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            activate_actions: Vec::new(),
            deactivate_actions: Vec::new(),
            trigger_behaviors: IndexMap::new(),
            superstate: None,
            substates: Vec::new(),
            active: false,
            initial_transition: None,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn entry_actions(&self) -> &[ActionBehavior<S, T, A>] {
        &self.entry_actions
    }

    pub fn exit_actions(&self) -> &[ActionBehavior<S, T, A>] {
        &self.exit_actions
    }

    pub fn activate_actions(&self) -> &[ActionBehavior<S, T, A>] {
        &self.activate_actions
    }

    pub fn deactivate_actions(&self) -> &[ActionBehavior<S, T, A>] {
        &self.deactivate_actions
    }

    pub fn trigger_behaviors(&self) -> &IndexMap<T, Vec<TriggerBehavior<S, T, A>>> {
        &self.trigger_behaviors
    }

    pub fn superstate(&self) -> Option<NodeId> {
        self.superstate
    }

    pub fn substates(&self) -> &[NodeId] {
        &self.substates
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn initial_transition(&self) -> Option<&S> {
        self.initial_transition.as_ref()
    }

    pub fn add_trigger_behavior(&mut self, behavior: TriggerBehavior<S, T, A>) {
        self.trigger_behaviors
            .entry(behavior.trigger().clone())
            .or_default()
            .push(behavior);
    }

    /// File the action under the slot its kind names. Internal actions
    /// belong to their trigger behavior and are refused here.
    pub(crate) fn add_action(&mut self, action: ActionBehavior<S, T, A>) {
        let slot = match action.kind() {
            ActionKind::Entry => &mut self.entry_actions,
            ActionKind::Exit => &mut self.exit_actions,
            ActionKind::Activate => &mut self.activate_actions,
            ActionKind::Deactivate => &mut self.deactivate_actions,
            ActionKind::Internal => {
                debug!(state = ?self.state, "internal action refused outside a trigger behavior");
                return;
            }
        };
        slot.push(action);
    }

    pub(crate) fn set_superstate(&mut self, superstate: NodeId) {
        self.superstate = Some(superstate);
    }

    pub(crate) fn add_substate(&mut self, substate: NodeId) {
        if !self.substates.contains(&substate) {
            self.substates.push(substate);
        }
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_initial_transition(&mut self, target: S) -> Result<(), ConfigurationError> {
        if let Some(existing) = &self.initial_transition {
            return Err(ConfigurationError::MultipleInitialTransitions {
                state: format!("{:?}", self.state),
                existing: format!("{existing:?}"),
            });
        }
        self.initial_transition = Some(target);
        Ok(())
    }

    /// Resolve `trigger` against this state's own behaviors.
    ///
    /// Each candidate's guard is evaluated once. More than one satisfied
    /// candidate is an ambiguity error. With none satisfied, the first
    /// candidate is returned with its unmet guards for diagnostics.
    pub fn try_find_local_handler(
        &self,
        trigger: &T,
        args: &A,
    ) -> Result<Option<TriggerBehaviorResult<'_, S, T, A>>, ConfigurationError> {
        let Some(candidates) = self.trigger_behaviors.get(trigger) else {
            return Ok(None);
        };

        let mut results: Vec<TriggerBehaviorResult<'_, S, T, A>> = candidates
            .iter()
            .map(|behavior| TriggerBehaviorResult {
                behavior,
                unmet_guards: behavior.unmet_guard_conditions(args),
            })
            .collect();

        let satisfied = results.iter().filter(|result| result.is_satisfied()).count();
        if satisfied > 1 {
            return Err(ConfigurationError::AmbiguousTransition {
                state: format!("{:?}", self.state),
                trigger: format!("{trigger:?}"),
            });
        }

        if results.is_empty() {
            return Ok(None);
        }
        let chosen = results
            .iter()
            .position(|result| result.is_satisfied())
            .unwrap_or(0);
        Ok(Some(results.swap_remove(chosen)))
    }

    /// Triggers with at least one locally satisfiable behavior, in
    /// registration order.
    pub fn local_permitted_triggers<'a>(&'a self, args: &'a A) -> impl Iterator<Item = &'a T> + 'a {
        self.trigger_behaviors
            .iter()
            .filter(move |(_, behaviors)| behaviors.iter().any(|b| b.guard_conditions_met(args)))
            .map(|(trigger, _)| trigger)
    }
}
