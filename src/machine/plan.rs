//! Ordered steps produced by traversing the hierarchy.
//!
//! Traversal decides what runs and in which order; the synchronous and the
//! async runner then walk the same steps. Building the full list before
//! running anything lets the synchronous runner reject suspension-capable
//! callables before the first side effect happens.

use crate::core::{Args, State, Transition, Trigger};
use crate::effects::{ActionBehavior, TransitionNotifier, UnhandledTriggerHandler};
use crate::machine::node::NodeId;
use crate::machine::MachineError;

pub(crate) enum Step<S, T, A> {
    /// Run one action. Activation actions carry no transition.
    Action {
        behavior: ActionBehavior<S, T, A>,
        transition: Option<Transition<S, T>>,
    },
    SetActive {
        node: NodeId,
        active: bool,
    },
    /// Move the current state.
    Commit(S),
    Notify(Transition<S, T>),
    Unhandled {
        state: S,
        trigger: T,
        unmet_guards: Vec<String>,
    },
}

pub(crate) struct Plan<S, T, A> {
    steps: Vec<Step<S, T, A>>,
}

impl<S: State, T: Trigger, A: Args> Plan<S, T, A> {
    pub(crate) fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub(crate) fn action(&mut self, behavior: &ActionBehavior<S, T, A>, transition: Option<&Transition<S, T>>) {
        self.steps.push(Step::Action {
            behavior: behavior.clone(),
            transition: transition.cloned(),
        });
    }

    pub(crate) fn set_active(&mut self, node: NodeId, active: bool) {
        self.steps.push(Step::SetActive { node, active });
    }

    pub(crate) fn commit(&mut self, state: S) {
        self.steps.push(Step::Commit(state));
    }

    pub(crate) fn notify(&mut self, transition: Transition<S, T>) {
        self.steps.push(Step::Notify(transition));
    }

    pub(crate) fn unhandled(&mut self, state: S, trigger: T, unmet_guards: Vec<String>) {
        self.steps.push(Step::Unhandled {
            state,
            trigger,
            unmet_guards,
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    /// Fail if any step would need the async runner.
    pub(crate) fn ensure_sync(
        &self,
        notifier: &TransitionNotifier<S, T>,
        unhandled: &UnhandledTriggerHandler<S, T>,
    ) -> Result<(), MachineError> {
        for step in &self.steps {
            match step {
                Step::Action {
                    behavior,
                    transition,
                } if behavior.is_async()
                    && transition
                        .as_ref()
                        .is_none_or(|transition| behavior.applies_to(transition)) =>
                {
                    return Err(MachineError::InvalidMode {
                        context: behavior.mode_context(),
                    });
                }
                Step::Notify(_) if notifier.has_async_listeners() => {
                    return Err(TransitionNotifier::<S, T>::mode_error());
                }
                Step::Unhandled { .. } if unhandled.is_async() => {
                    return Err(UnhandledTriggerHandler::<S, T>::mode_error());
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub(crate) fn into_steps(self) -> Vec<Step<S, T, A>> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ActionKind;

    fn sync_entry() -> ActionBehavior<&'static str, &'static str, ()> {
        ActionBehavior::with_transition(
            ActionKind::Entry,
            "Open",
            |_: &Transition<&'static str, &'static str>, _: &()| Ok(()),
            None,
            "Function",
        )
    }

    fn async_entry() -> ActionBehavior<&'static str, &'static str, ()> {
        ActionBehavior::with_transition_async(
            ActionKind::Entry,
            "Open",
            |_, _| async { Ok(()) },
            Some("slow door"),
            "Function",
        )
    }

    #[test]
    fn sync_plan_passes() {
        let mut plan = Plan::new();
        let transition = Transition::new("Closed", "Open", "Pull");
        plan.action(&sync_entry(), Some(&transition));
        plan.commit("Open");
        plan.notify(transition);

        assert!(plan
            .ensure_sync(&TransitionNotifier::new(), &UnhandledTriggerHandler::default())
            .is_ok());
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn async_action_is_rejected_up_front() {
        let mut plan = Plan::new();
        let transition = Transition::new("Closed", "Open", "Pull");
        plan.commit("Open");
        plan.action(&async_entry(), Some(&transition));

        let error = plan
            .ensure_sync(&TransitionNotifier::new(), &UnhandledTriggerHandler::default())
            .unwrap_err();

        assert!(error.is_invalid_mode());
        assert!(error.to_string().contains("slow door"));
    }

    #[test]
    fn async_action_for_another_trigger_is_not_rejected() {
        let mut plan = Plan::new();
        let transition = Transition::new("Closed", "Open", "Pull");
        plan.action(&async_entry().only_from("Kick"), Some(&transition));
        plan.commit("Open");

        assert!(plan
            .ensure_sync(&TransitionNotifier::new(), &UnhandledTriggerHandler::default())
            .is_ok());

        let mut kicked = Plan::new();
        let transition = Transition::new("Closed", "Open", "Kick");
        kicked.action(&async_entry().only_from("Kick"), Some(&transition));
        assert!(kicked
            .ensure_sync(&TransitionNotifier::new(), &UnhandledTriggerHandler::default())
            .unwrap_err()
            .is_invalid_mode());
    }

    #[test]
    fn async_listener_is_rejected_only_when_notifying() {
        let mut notifier = TransitionNotifier::new();
        notifier.register_async(|_| async {});

        let mut quiet: Plan<&'static str, &'static str, ()> = Plan::new();
        quiet.commit("Open");
        assert!(quiet
            .ensure_sync(&notifier, &UnhandledTriggerHandler::default())
            .is_ok());

        let mut loud: Plan<&'static str, &'static str, ()> = Plan::new();
        loud.notify(Transition::new("Closed", "Open", "Pull"));
        assert!(loud
            .ensure_sync(&notifier, &UnhandledTriggerHandler::default())
            .unwrap_err()
            .is_invalid_mode());
    }
}
