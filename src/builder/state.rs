//! Fluent configuration of a single state.

use crate::builder::error::ConfigurationError;
use crate::core::{Args, GuardCondition, InvocationInfo, State, Timing, Transition, TransitionGuard, Trigger};
use crate::effects::{ActionBehavior, ActionKind, DynamicStateInfo, DynamicTransitionInfo, TriggerBehavior};
use crate::machine::{ActionResult, MachineOptions, NodeId, StateGraph};
use std::future::Future;
use std::sync::Arc;

/// Configures one state of a [`StateMachine`](crate::machine::StateMachine).
///
/// Obtained from `StateMachine::configure`. Every method registers its
/// behavior or action immediately and hands the configuration back for
/// chaining. Registration order is kept: actions in the same slot run in the
/// order they were added.
///
/// # Example
///
/// ```rust
/// use hierarch::machine::StateMachine;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Player { Stopped, Playing, Paused }
///
/// let mut player: StateMachine<Player, &str, u32> = StateMachine::new(Player::Stopped);
/// player
///     .configure(Player::Stopped)
///     .permit_if("play", Player::Playing, |volume: &u32| *volume > 0, Some("audible"));
/// player
///     .configure(Player::Paused)
///     .substate_of(Player::Playing)
///     .unwrap();
///
/// assert!(player.can_fire_with(&"play", &3).unwrap());
/// assert!(!player.can_fire_with(&"play", &0).unwrap());
/// ```
pub struct StateConfiguration<'m, S, T, A> {
    graph: &'m mut StateGraph<S, T, A>,
    options: &'m MachineOptions,
    id: NodeId,
}

impl<'m, S: State, T: Trigger, A: Args> StateConfiguration<'m, S, T, A> {
    pub(crate) fn new(graph: &'m mut StateGraph<S, T, A>, options: &'m MachineOptions, id: NodeId) -> Self {
        Self { graph, options, id }
    }

    /// The state being configured.
    pub fn state(&self) -> &S {
        self.graph.node(self.id).state()
    }

    fn default_description(&self) -> &str {
        &self.options.default_function_description
    }

    fn guard<F>(&self, predicate: F, description: Option<&str>) -> TransitionGuard<A>
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        TransitionGuard::empty().with_condition(GuardCondition::new(
            predicate,
            description,
            self.default_description(),
        ))
    }

    fn add_behavior(self, behavior: TriggerBehavior<S, T, A>) -> Self {
        self.graph.node_mut(self.id).add_trigger_behavior(behavior);
        self
    }

    fn add_action(self, action: ActionBehavior<S, T, A>) -> Self {
        self.graph.node_mut(self.id).add_action(action);
        self
    }

    /// Move to `destination` when `trigger` fires.
    pub fn permit(self, trigger: T, destination: S) -> Self {
        self.permit_guarded(trigger, destination, TransitionGuard::empty())
    }

    /// Move to `destination` when `trigger` fires and `predicate` holds.
    pub fn permit_if<F>(self, trigger: T, destination: S, predicate: F, description: Option<&str>) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let guard = self.guard(predicate, description);
        self.permit_guarded(trigger, destination, guard)
    }

    /// Move to `destination` when every condition of `guard` holds.
    ///
    /// Conditions built with the crate-wide default description take the
    /// machine's configured default instead.
    pub fn permit_guarded(self, trigger: T, destination: S, guard: TransitionGuard<A>) -> Self {
        let guard = guard.with_default_description(self.default_description());
        self.add_behavior(TriggerBehavior::fixed(trigger, destination, guard))
    }

    /// Exit and re-enter this state when `trigger` fires.
    pub fn permit_reentry(self, trigger: T) -> Self {
        let state = self.state().clone();
        self.add_behavior(TriggerBehavior::reentrant(trigger, state, TransitionGuard::empty()))
    }

    pub fn permit_reentry_if<F>(self, trigger: T, predicate: F, description: Option<&str>) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let state = self.state().clone();
        let guard = self.guard(predicate, description);
        self.add_behavior(TriggerBehavior::reentrant(trigger, state, guard))
    }

    /// Move to whatever state `selector` picks from the fire arguments.
    ///
    /// `possible_destinations` is descriptive only and never checked.
    pub fn permit_dynamic<F>(
        self,
        trigger: T,
        selector: F,
        selector_description: Option<&str>,
        possible_destinations: Vec<DynamicStateInfo<S>>,
    ) -> Self
    where
        F: Fn(&A) -> S + Send + Sync + 'static,
    {
        self.dynamic(trigger, selector, selector_description, possible_destinations, TransitionGuard::empty())
    }

    pub fn permit_dynamic_if<F, G>(
        self,
        trigger: T,
        selector: F,
        selector_description: Option<&str>,
        possible_destinations: Vec<DynamicStateInfo<S>>,
        predicate: G,
        guard_description: Option<&str>,
    ) -> Self
    where
        F: Fn(&A) -> S + Send + Sync + 'static,
        G: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let guard = self.guard(predicate, guard_description);
        self.dynamic(trigger, selector, selector_description, possible_destinations, guard)
    }

    fn dynamic<F>(
        self,
        trigger: T,
        selector: F,
        selector_description: Option<&str>,
        possible_destinations: Vec<DynamicStateInfo<S>>,
        guard: TransitionGuard<A>,
    ) -> Self
    where
        F: Fn(&A) -> S + Send + Sync + 'static,
    {
        let info = DynamicTransitionInfo::new(
            InvocationInfo::of(
                &selector,
                selector_description,
                Timing::Synchronous,
                self.default_description(),
            ),
            possible_destinations,
        );
        self.add_behavior(TriggerBehavior::dynamic(trigger, Arc::new(selector), info, guard))
    }

    /// Run `action` in place when `trigger` fires, without leaving the state.
    pub fn internal_transition<F>(self, trigger: T, action: F, description: Option<&str>) -> Self
    where
        F: Fn(&Transition<S, T>, &A) -> ActionResult + Send + Sync + 'static,
    {
        self.internal(trigger, action, description, TransitionGuard::empty())
    }

    pub fn internal_transition_if<G, F>(
        self,
        trigger: T,
        predicate: G,
        guard_description: Option<&str>,
        action: F,
        description: Option<&str>,
    ) -> Self
    where
        G: Fn(&A) -> bool + Send + Sync + 'static,
        F: Fn(&Transition<S, T>, &A) -> ActionResult + Send + Sync + 'static,
    {
        let guard = self.guard(predicate, guard_description);
        self.internal(trigger, action, description, guard)
    }

    fn internal<F>(self, trigger: T, action: F, description: Option<&str>, guard: TransitionGuard<A>) -> Self
    where
        F: Fn(&Transition<S, T>, &A) -> ActionResult + Send + Sync + 'static,
    {
        let action = ActionBehavior::with_transition(
            ActionKind::Internal,
            self.state().clone(),
            action,
            description,
            self.default_description(),
        );
        self.add_behavior(TriggerBehavior::internal(trigger, action, guard))
    }

    pub fn internal_transition_async<F, Fut>(self, trigger: T, action: F, description: Option<&str>) -> Self
    where
        F: Fn(Transition<S, T>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let action = ActionBehavior::with_transition_async(
            ActionKind::Internal,
            self.state().clone(),
            action,
            description,
            self.default_description(),
        );
        self.add_behavior(TriggerBehavior::internal(trigger, action, TransitionGuard::empty()))
    }

    /// Run `action` whenever a transition enters this state.
    pub fn on_entry<F>(self, action: F, description: Option<&str>) -> Self
    where
        F: Fn(&Transition<S, T>, &A) -> ActionResult + Send + Sync + 'static,
    {
        let action = ActionBehavior::with_transition(
            ActionKind::Entry,
            self.state().clone(),
            action,
            description,
            self.default_description(),
        );
        self.add_action(action)
    }

    pub fn on_entry_async<F, Fut>(self, action: F, description: Option<&str>) -> Self
    where
        F: Fn(Transition<S, T>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let action = ActionBehavior::with_transition_async(
            ActionKind::Entry,
            self.state().clone(),
            action,
            description,
            self.default_description(),
        );
        self.add_action(action)
    }

    /// Run `action` on entry, but only for transitions fired by `trigger`.
    pub fn on_entry_from<F>(self, trigger: T, action: F, description: Option<&str>) -> Self
    where
        F: Fn(&Transition<S, T>, &A) -> ActionResult + Send + Sync + 'static,
    {
        let action = ActionBehavior::with_transition(
            ActionKind::Entry,
            self.state().clone(),
            action,
            description,
            self.default_description(),
        )
        .only_from(trigger);
        self.add_action(action)
    }

    pub fn on_entry_from_async<F, Fut>(self, trigger: T, action: F, description: Option<&str>) -> Self
    where
        F: Fn(Transition<S, T>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let action = ActionBehavior::with_transition_async(
            ActionKind::Entry,
            self.state().clone(),
            action,
            description,
            self.default_description(),
        )
        .only_from(trigger);
        self.add_action(action)
    }

    pub fn on_exit<F>(self, action: F, description: Option<&str>) -> Self
    where
        F: Fn(&Transition<S, T>) -> ActionResult + Send + Sync + 'static,
    {
        let action = ActionBehavior::exit(self.state().clone(), action, description, self.default_description());
        self.add_action(action)
    }

    pub fn on_exit_async<F, Fut>(self, action: F, description: Option<&str>) -> Self
    where
        F: Fn(Transition<S, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let action =
            ActionBehavior::exit_async(self.state().clone(), action, description, self.default_description());
        self.add_action(action)
    }

    pub fn on_activate<F>(self, action: F, description: Option<&str>) -> Self
    where
        F: Fn() -> ActionResult + Send + Sync + 'static,
    {
        self.activation(ActionKind::Activate, action, description)
    }

    pub fn on_activate_async<F, Fut>(self, action: F, description: Option<&str>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        self.activation_async(ActionKind::Activate, action, description)
    }

    pub fn on_deactivate<F>(self, action: F, description: Option<&str>) -> Self
    where
        F: Fn() -> ActionResult + Send + Sync + 'static,
    {
        self.activation(ActionKind::Deactivate, action, description)
    }

    pub fn on_deactivate_async<F, Fut>(self, action: F, description: Option<&str>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        self.activation_async(ActionKind::Deactivate, action, description)
    }

    fn activation<F>(self, kind: ActionKind, action: F, description: Option<&str>) -> Self
    where
        F: Fn() -> ActionResult + Send + Sync + 'static,
    {
        let action = ActionBehavior::activation(
            kind,
            self.state().clone(),
            action,
            description,
            self.default_description(),
        );
        self.add_action(action)
    }

    fn activation_async<F, Fut>(self, kind: ActionKind, action: F, description: Option<&str>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let action = ActionBehavior::activation_async(
            kind,
            self.state().clone(),
            action,
            description,
            self.default_description(),
        );
        self.add_action(action)
    }

    /// Make this state a substate of `superstate`.
    pub fn substate_of(self, superstate: S) -> Result<Self, ConfigurationError> {
        let superstate = self.graph.ensure(superstate);
        self.graph.set_superstate(self.id, superstate)?;
        Ok(self)
    }

    /// Enter `target` automatically whenever this state is entered.
    ///
    /// `target` must end up a direct substate of this state; that is checked
    /// when the initial transition is taken, since substates may be linked
    /// after this call.
    pub fn initial_transition(self, target: S) -> Result<Self, ConfigurationError> {
        self.graph.ensure(target.clone());
        self.graph.node_mut(self.id).set_initial_transition(target)?;
        Ok(self)
    }
}
