//! The state arena and the hierarchical traversals over it.
//!
//! Nodes are owned by the arena and refer to each other by [`NodeId`], so
//! the superstate back-references never form ownership cycles. Traversals
//! do not run anything themselves: they append the actions to run, in
//! order, to a [`Plan`].

use crate::builder::ConfigurationError;
use crate::core::{Args, State, Transition, Trigger};
use crate::machine::node::{NodeId, StateNode, TriggerBehaviorResult};
use crate::machine::plan::Plan;
use indexmap::IndexMap;
use std::collections::HashSet;

pub(crate) struct StateGraph<S, T, A> {
    nodes: Vec<StateNode<S, T, A>>,
    index: IndexMap<S, NodeId>,
}

impl<S: State, T: Trigger, A: Args> StateGraph<S, T, A> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: IndexMap::new(),
        }
    }

    /// Node for `state`, created empty on first use.
    pub(crate) fn ensure(&mut self, state: S) -> NodeId {
        if let Some(id) = self.index.get(&state) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(StateNode::new(state.clone()));
        self.index.insert(state, id);
        id
    }

    pub(crate) fn id_of(&self, state: &S) -> Option<NodeId> {
        self.index.get(state).copied()
    }

    pub(crate) fn node(&self, id: NodeId) -> &StateNode<S, T, A> {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut StateNode<S, T, A> {
        &mut self.nodes[id.0]
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &StateNode<S, T, A>> {
        self.nodes.iter()
    }

    /// `id` and its ancestors, nearest first.
    pub(crate) fn ancestry(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.node(*current).superstate())
    }

    /// True if `state` is this node or lies anywhere below it.
    pub(crate) fn includes(&self, id: NodeId, state: &S) -> bool {
        let node = self.node(id);
        node.state() == state
            || node
                .substates()
                .iter()
                .any(|substate| self.includes(*substate, state))
    }

    /// True if `state` is this node or one of its ancestors.
    pub(crate) fn is_included_in(&self, id: NodeId, state: &S) -> bool {
        self.ancestry(id).any(|ancestor| self.node(ancestor).state() == state)
    }

    /// Link `substate` under `superstate`, refusing cycles and second parents.
    pub(crate) fn set_superstate(
        &mut self,
        substate: NodeId,
        superstate: NodeId,
    ) -> Result<(), ConfigurationError> {
        match self.node(substate).superstate() {
            Some(existing) if existing == superstate => return Ok(()),
            Some(existing) => {
                return Err(ConfigurationError::SuperstateAlreadySet {
                    state: format!("{:?}", self.node(substate).state()),
                    existing: format!("{:?}", self.node(existing).state()),
                    requested: format!("{:?}", self.node(superstate).state()),
                });
            }
            None => {}
        }

        if self.is_included_in(superstate, self.node(substate).state()) {
            return Err(ConfigurationError::SuperstateCycle {
                state: format!("{:?}", self.node(substate).state()),
                superstate: format!("{:?}", self.node(superstate).state()),
            });
        }

        self.node_mut(substate).set_superstate(superstate);
        self.node_mut(superstate).add_substate(substate);
        Ok(())
    }

    /// Resolve `trigger` starting at `id` and walking up the hierarchy.
    ///
    /// A satisfied local behavior wins. Otherwise the superstate's answer is
    /// used, falling back to the local unsatisfied candidate so its unmet
    /// guards can be reported.
    pub(crate) fn try_find_handler(
        &self,
        id: NodeId,
        trigger: &T,
        args: &A,
    ) -> Result<Option<TriggerBehaviorResult<'_, S, T, A>>, ConfigurationError> {
        let node = self.node(id);
        let local = node.try_find_local_handler(trigger, args)?;
        if local.as_ref().is_some_and(|result| result.is_satisfied()) {
            return Ok(local);
        }

        let inherited = match node.superstate() {
            Some(superstate) => self.try_find_handler(superstate, trigger, args)?,
            None => None,
        };
        Ok(inherited.or(local))
    }

    /// Union of the permitted triggers of `id` and its ancestors.
    pub(crate) fn permitted_triggers(&self, id: NodeId, args: &A) -> Vec<T> {
        let mut seen = HashSet::new();
        let mut permitted = Vec::new();
        for ancestor in self.ancestry(id) {
            for trigger in self.node(ancestor).local_permitted_triggers(args) {
                if seen.insert(trigger) {
                    permitted.push(trigger.clone());
                }
            }
        }
        permitted
    }

    fn plan_entry_actions(&self, id: NodeId, transition: &Transition<S, T>, plan: &mut Plan<S, T, A>) {
        let node = self.node(id);
        for action in node.entry_actions() {
            plan.action(action, Some(transition));
        }
        for action in node.activate_actions() {
            plan.action(action, None);
        }
    }

    fn plan_exit_actions(&self, id: NodeId, transition: &Transition<S, T>, plan: &mut Plan<S, T, A>) {
        let node = self.node(id);
        for action in node.deactivate_actions() {
            plan.action(action, None);
        }
        for action in node.exit_actions() {
            plan.action(action, Some(transition));
        }
    }

    /// Enter `id` for `transition`.
    ///
    /// Reentry and initial transitions enter only this node. Otherwise every
    /// ancestor that does not already contain the source is entered first,
    /// outermost down.
    pub(crate) fn plan_enter(&self, id: NodeId, transition: &Transition<S, T>, plan: &mut Plan<S, T, A>) {
        if transition.is_reentry() || transition.is_initial() {
            self.plan_entry_actions(id, transition, plan);
            return;
        }

        let entering: Vec<NodeId> = self
            .ancestry(id)
            .take_while(|node| !self.includes(*node, transition.source()))
            .collect();
        for node in entering.into_iter().rev() {
            self.plan_entry_actions(node, transition, plan);
        }
    }

    /// Exit `id` for `transition`, bubbling up to superstates.
    ///
    /// A superstate is exited when the destination lies outside the whole
    /// ancestor chain, or when it lies inside the chain but is not that very
    /// superstate. Returns the record as last seen, whose source is the
    /// outermost state whose exit was considered.
    pub(crate) fn plan_exit(
        &self,
        id: NodeId,
        transition: &Transition<S, T>,
        plan: &mut Plan<S, T, A>,
    ) -> Transition<S, T> {
        let mut current = id;
        let mut transition = transition.clone();

        loop {
            if transition.is_reentry() {
                self.plan_exit_actions(current, &transition, plan);
                return transition;
            }

            if self.includes(current, transition.destination()) {
                return transition;
            }

            self.plan_exit_actions(current, &transition, plan);

            let Some(superstate) = self.node(current).superstate() else {
                return transition;
            };

            let superstate_state = self.node(superstate).state();
            if self.is_included_in(current, transition.destination())
                && superstate_state == transition.destination()
            {
                return transition;
            }

            transition = transition.with_source(superstate_state.clone());
            current = superstate;
        }
    }

    /// Activate `id`: ancestors first, each only if not already active.
    pub(crate) fn plan_activate(&self, id: NodeId, plan: &mut Plan<S, T, A>) {
        let chain: Vec<NodeId> = self.ancestry(id).collect();
        for node_id in chain.into_iter().rev() {
            let node = self.node(node_id);
            if node.is_active() {
                continue;
            }
            for action in node.activate_actions() {
                plan.action(action, None);
            }
            plan.set_active(node_id, true);
        }
    }

    /// Deactivate `id`, then its ancestors, stopping at the first inactive one.
    pub(crate) fn plan_deactivate(&self, id: NodeId, plan: &mut Plan<S, T, A>) {
        for node_id in self.ancestry(id) {
            let node = self.node(node_id);
            if !node.is_active() {
                break;
            }
            for action in node.deactivate_actions() {
                plan.action(action, None);
            }
            plan.set_active(node_id, false);
        }
    }
}
