//! The machine: current state, trigger dispatch and the two runners.

use crate::builder::{ConfigurationError, StateConfiguration};
use crate::core::{Args, State, Transition, Trigger};
use crate::effects::{ActionBehavior, Invocation, TransitionNotifier, UnhandledTriggerHandler};
use crate::machine::graph::StateGraph;
use crate::machine::node::{NodeId, StateNode};
use crate::machine::options::MachineOptions;
use crate::machine::plan::{Plan, Step};
use crate::machine::queue::TriggerQueue;
use crate::machine::{ActionResult, MachineError};
use std::future::Future;
use tracing::{debug, trace};

/// How a fired trigger resolved against the current state.
enum Resolution<S, T, A> {
    Unhandled(Vec<String>),
    Internal(ActionBehavior<S, T, A>),
    Transition(Transition<S, T>),
}

/// A hierarchical state machine over caller-defined states `S`, triggers `T`
/// and fire arguments `A`.
///
/// The machine is configured through [`StateMachine::configure`] and driven
/// with the `fire` family. The synchronous path refuses to run any
/// suspension-capable action, listener or handler; the async path runs both
/// kinds, one at a time and in the same order.
///
/// A trigger fired while another is being processed is queued through
/// [`StateMachine::trigger_queue`] and handled once the current transition
/// has finished.
///
/// # Example
///
/// ```rust
/// use hierarch::machine::StateMachine;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door { Open, Closed, Locked }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Action { Close, Lock }
///
/// let mut door: StateMachine<Door, Action> = StateMachine::new(Door::Open);
/// door.configure(Door::Open).permit(Action::Close, Door::Closed);
/// door.configure(Door::Closed).permit(Action::Lock, Door::Locked);
///
/// door.fire(Action::Close).unwrap();
/// door.fire(Action::Lock).unwrap();
///
/// assert_eq!(door.state(), &Door::Locked);
/// assert!(door.fire(Action::Close).unwrap_err().is_unhandled_trigger());
/// ```
pub struct StateMachine<S, T, A = ()> {
    graph: StateGraph<S, T, A>,
    state: S,
    notifier: TransitionNotifier<S, T>,
    unhandled: UnhandledTriggerHandler<S, T>,
    queue: TriggerQueue<T, A>,
    options: MachineOptions,
}

impl<S: State, T: Trigger, A: Args> StateMachine<S, T, A> {
    pub fn new(initial: S) -> Self {
        Self::with_options(initial, MachineOptions::default())
    }

    pub fn with_options(initial: S, options: MachineOptions) -> Self {
        let mut graph = StateGraph::new();
        graph.ensure(initial.clone());
        Self {
            graph,
            state: initial,
            notifier: TransitionNotifier::new(),
            unhandled: UnhandledTriggerHandler::default(),
            queue: TriggerQueue::new(),
            options,
        }
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    /// Begin configuring `state`, creating its node if needed.
    pub fn configure(&mut self, state: S) -> StateConfiguration<'_, S, T, A> {
        let id = self.graph.ensure(state);
        StateConfiguration::new(&mut self.graph, &self.options, id)
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// True if `state` is the current state or one of its superstates.
    pub fn is_in_state(&self, state: &S) -> bool {
        match self.graph.id_of(&self.state) {
            Some(current) => self.graph.is_included_in(current, state),
            None => &self.state == state,
        }
    }

    pub fn node(&self, state: &S) -> Option<&StateNode<S, T, A>> {
        self.graph.id_of(state).map(|id| self.graph.node(id))
    }

    /// Every configured state, in the order it was first seen.
    pub fn states(&self) -> impl Iterator<Item = &StateNode<S, T, A>> {
        self.graph.nodes()
    }

    /// Superstate of `state`, if it has one.
    pub fn superstate_of(&self, state: &S) -> Option<&S> {
        let node = self.node(state)?;
        node.superstate().map(|id| self.graph.node(id).state())
    }

    /// Substates of `state`, in the order they were linked.
    pub fn substates_of(&self, state: &S) -> Vec<&S> {
        self.node(state)
            .map(|node| {
                node.substates()
                    .iter()
                    .map(|id| self.graph.node(*id).state())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A handle for firing triggers from inside actions.
    pub fn trigger_queue(&self) -> TriggerQueue<T, A> {
        self.queue.clone()
    }

    /// Register a listener called after every completed transition.
    pub fn on_transitioned<F>(&mut self, listener: F)
    where
        F: Fn(&Transition<S, T>) + Send + Sync + 'static,
    {
        self.notifier.register(listener);
    }

    pub fn on_transitioned_async<F, Fut>(&mut self, listener: F)
    where
        F: Fn(Transition<S, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.notifier.register_async(listener);
    }

    /// Replace the default unhandled-trigger policy.
    pub fn on_unhandled_trigger<F>(&mut self, handler: F)
    where
        F: Fn(&S, &T, &[String]) -> ActionResult + Send + Sync + 'static,
    {
        self.unhandled = UnhandledTriggerHandler::sync(handler);
    }

    pub fn on_unhandled_trigger_async<F, Fut>(&mut self, handler: F)
    where
        F: Fn(S, T, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        self.unhandled = UnhandledTriggerHandler::asynchronous(handler);
    }

    pub fn can_fire(&self, trigger: &T) -> Result<bool, MachineError>
    where
        A: Default,
    {
        self.can_fire_with(trigger, &A::default())
    }

    /// True if `trigger` would be handled from the current state with `args`.
    pub fn can_fire_with(&self, trigger: &T, args: &A) -> Result<bool, MachineError> {
        let Some(current) = self.graph.id_of(&self.state) else {
            return Ok(false);
        };
        let handler = self.graph.try_find_handler(current, trigger, args)?;
        Ok(handler.is_some_and(|result| result.is_satisfied()))
    }

    pub fn permitted_triggers(&self) -> Vec<T>
    where
        A: Default,
    {
        self.permitted_triggers_with(&A::default())
    }

    /// Triggers with a satisfiable behavior on the current state or an ancestor.
    pub fn permitted_triggers_with(&self, args: &A) -> Vec<T> {
        self.graph
            .id_of(&self.state)
            .map(|current| self.graph.permitted_triggers(current, args))
            .unwrap_or_default()
    }

    pub fn fire(&mut self, trigger: T) -> Result<(), MachineError>
    where
        A: Default,
    {
        self.fire_with(trigger, A::default())
    }

    /// Fire `trigger` and run it, and everything it queues, to completion.
    ///
    /// Fails with [`MachineError::InvalidMode`] before running anything if
    /// the transition would need a suspension-capable callable.
    pub fn fire_with(&mut self, trigger: T, args: A) -> Result<(), MachineError> {
        self.queue.enqueue_with(trigger, args);
        let result = self.drain();
        self.finish(result)
    }

    pub async fn fire_async(&mut self, trigger: T) -> Result<(), MachineError>
    where
        A: Default,
    {
        self.fire_async_with(trigger, A::default()).await
    }

    /// Fire `trigger`, awaiting each action in turn.
    pub async fn fire_async_with(&mut self, trigger: T, args: A) -> Result<(), MachineError> {
        self.queue.enqueue_with(trigger, args);
        let result = self.drain_async().await;
        self.finish(result)
    }

    /// Run the activate actions of the current state and its inactive
    /// ancestors, outermost first.
    pub fn activate(&mut self) -> Result<(), MachineError> {
        let plan = self.plan_activation(true);
        self.run(plan, None)
    }

    pub async fn activate_async(&mut self) -> Result<(), MachineError> {
        let plan = self.plan_activation(true);
        self.run_async(plan, None).await
    }

    /// Run the deactivate actions of the current state and its active
    /// ancestors, innermost first.
    pub fn deactivate(&mut self) -> Result<(), MachineError> {
        let plan = self.plan_activation(false);
        self.run(plan, None)
    }

    pub async fn deactivate_async(&mut self) -> Result<(), MachineError> {
        let plan = self.plan_activation(false);
        self.run_async(plan, None).await
    }

    fn finish(&mut self, result: Result<(), MachineError>) -> Result<(), MachineError> {
        if let Err(error) = &result {
            if self.options.clear_queue_on_error {
                let dropped = self.queue.clear();
                if dropped > 0 {
                    debug!(dropped, %error, "discarded queued triggers after failed fire");
                }
            }
        }
        result
    }

    fn drain(&mut self) -> Result<(), MachineError> {
        while let Some((trigger, args)) = self.queue.pop() {
            let plan = self.plan_fire(&trigger, &args)?;
            self.run(plan, Some(&args))?;
        }
        Ok(())
    }

    async fn drain_async(&mut self) -> Result<(), MachineError> {
        while let Some((trigger, args)) = self.queue.pop() {
            let plan = self.plan_fire(&trigger, &args)?;
            self.run_async(plan, Some(&args)).await?;
        }
        Ok(())
    }

    fn plan_activation(&mut self, activate: bool) -> Plan<S, T, A> {
        let current = self.graph.ensure(self.state.clone());
        let mut plan = Plan::new();
        if activate {
            self.graph.plan_activate(current, &mut plan);
        } else {
            self.graph.plan_deactivate(current, &mut plan);
        }
        plan
    }

    fn resolve(&self, current: NodeId, trigger: &T, args: &A) -> Result<Resolution<S, T, A>, MachineError> {
        let Some(result) = self.graph.try_find_handler(current, trigger, args)? else {
            return Ok(Resolution::Unhandled(Vec::new()));
        };
        if !result.is_satisfied() {
            return Ok(Resolution::Unhandled(result.into_unmet_guards()));
        }

        let behavior = result.behavior();
        let resolution = match behavior.results_in_transition_from(&self.state, args) {
            Some(destination) => {
                Resolution::Transition(behavior.transition_from(self.state.clone(), destination))
            }
            None => behavior
                .internal_action()
                .cloned()
                .map_or(Resolution::Unhandled(Vec::new()), Resolution::Internal),
        };
        Ok(resolution)
    }

    fn plan_fire(&mut self, trigger: &T, args: &A) -> Result<Plan<S, T, A>, MachineError> {
        debug!(state = ?self.state, trigger = ?trigger, "firing trigger");
        let current = self.graph.ensure(self.state.clone());
        let mut plan = Plan::new();

        match self.resolve(current, trigger, args)? {
            Resolution::Unhandled(unmet_guards) => {
                debug!(state = ?self.state, trigger = ?trigger, ?unmet_guards, "trigger not handled");
                plan.unhandled(self.state.clone(), trigger.clone(), unmet_guards);
            }
            Resolution::Internal(action) => {
                let transition = Transition::new(self.state.clone(), self.state.clone(), trigger.clone());
                plan.action(&action, Some(&transition));
            }
            Resolution::Transition(transition) => {
                let destination = self.graph.ensure(transition.destination().clone());
                self.plan_transition(current, destination, transition, &mut plan)?;
            }
        }

        trace!(steps = plan.len(), "planned trigger");
        Ok(plan)
    }

    /// Exit, commit, enter, follow initial transitions, then notify.
    fn plan_transition(
        &self,
        source: NodeId,
        destination: NodeId,
        transition: Transition<S, T>,
        plan: &mut Plan<S, T, A>,
    ) -> Result<(), ConfigurationError> {
        if transition.is_reentry() && transition.source() != transition.destination() {
            // inherited reentry: leave the substates first, then reenter the owner
            let outward = Transition::new(
                transition.source().clone(),
                transition.destination().clone(),
                transition.trigger().clone(),
            );
            self.graph.plan_exit(source, &outward, plan);

            let reentry = Transition::reentry(transition.destination().clone(), transition.trigger().clone());
            self.graph.plan_exit(destination, &reentry, plan);
            plan.commit(reentry.destination().clone());
            self.graph.plan_enter(destination, &reentry, plan);
        } else {
            self.graph.plan_exit(source, &transition, plan);
            plan.commit(transition.destination().clone());
            self.graph.plan_enter(destination, &transition, plan);
        }

        let mut completed = transition;
        let mut current = destination;
        while let Some(target) = self.graph.node(current).initial_transition() {
            let parent = self.graph.node(current).state();
            let target_id = self
                .graph
                .id_of(target)
                .filter(|id| self.graph.node(*id).superstate() == Some(current))
                .ok_or_else(|| ConfigurationError::InitialTransitionNotSubstate {
                    state: format!("{parent:?}"),
                    target: format!("{target:?}"),
                })?;

            let initial = Transition::initial(
                completed.source().clone(),
                target.clone(),
                completed.trigger().clone(),
            );
            plan.commit(target.clone());
            self.graph.plan_enter(target_id, &initial, plan);

            completed = completed.with_destination(target.clone());
            current = target_id;
        }

        plan.notify(completed);
        Ok(())
    }

    fn invocation<'a>(transition: Option<&'a Transition<S, T>>, args: Option<&'a A>) -> Invocation<'a, S, T, A> {
        match (transition, args) {
            (Some(transition), Some(args)) => Invocation::Transition { transition, args },
            _ => Invocation::Activation,
        }
    }

    fn run(&mut self, plan: Plan<S, T, A>, args: Option<&A>) -> Result<(), MachineError> {
        plan.ensure_sync(&self.notifier, &self.unhandled)?;

        for step in plan.into_steps() {
            match step {
                Step::Action { behavior, transition } => {
                    behavior.execute(Self::invocation(transition.as_ref(), args))?;
                }
                Step::SetActive { node, active } => self.graph.node_mut(node).set_active(active),
                Step::Commit(state) => {
                    trace!(from = ?self.state, to = ?state, "state committed");
                    self.state = state;
                }
                Step::Notify(transition) => {
                    debug!(?transition, "transition completed");
                    self.notifier.invoke(&transition)?;
                }
                Step::Unhandled {
                    state,
                    trigger,
                    unmet_guards,
                } => self.unhandled.execute(&state, &trigger, &unmet_guards)?,
            }
        }
        Ok(())
    }

    async fn run_async(&mut self, plan: Plan<S, T, A>, args: Option<&A>) -> Result<(), MachineError> {
        for step in plan.into_steps() {
            match step {
                Step::Action { behavior, transition } => {
                    behavior
                        .execute_async(Self::invocation(transition.as_ref(), args))
                        .await?;
                }
                Step::SetActive { node, active } => self.graph.node_mut(node).set_active(active),
                Step::Commit(state) => {
                    trace!(from = ?self.state, to = ?state, "state committed");
                    self.state = state;
                }
                Step::Notify(transition) => {
                    debug!(?transition, "transition completed");
                    self.notifier.invoke_async(&transition).await;
                }
                Step::Unhandled {
                    state,
                    trigger,
                    unmet_guards,
                } => {
                    self.unhandled
                        .execute_async(&state, &trigger, &unmet_guards)
                        .await?
                }
            }
        }
        Ok(())
    }
}
