//! User side effects attached to states.
//!
//! Every entry, exit, activate, deactivate and internal action is stored as
//! an [`ActionBehavior`]: the callable, the state it belongs to, the slot it
//! occupies and a description. A behavior registered synchronously can be
//! driven from either fire path. One registered as suspension-capable can
//! only be driven from the async path; invoking it synchronously is an
//! [`MachineError::InvalidMode`] error.

use crate::core::{Args, InvocationInfo, State, Timing, Transition, Trigger};
use crate::machine::{ActionResult, MachineError};
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The slot an action occupies on its state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Entry,
    Exit,
    Activate,
    Deactivate,
    Internal,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entry => "OnEntry",
            Self::Exit => "OnExit",
            Self::Activate => "OnActivate",
            Self::Deactivate => "OnDeactivate",
            Self::Internal => "InternalTransition",
        };
        f.write_str(name)
    }
}

/// What an action is invoked with.
///
/// Entry, exit and internal actions run as part of a transition and see its
/// record and the fire arguments. Activate and deactivate actions run
/// without either.
pub enum Invocation<'a, S, T, A> {
    Transition {
        transition: &'a Transition<S, T>,
        args: &'a A,
    },
    Activation,
}

impl<S, T, A> Clone for Invocation<'_, S, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T, A> Copy for Invocation<'_, S, T, A> {}

pub type SyncAction<S, T, A> =
    Arc<dyn for<'a> Fn(Invocation<'a, S, T, A>) -> ActionResult + Send + Sync>;

pub type AsyncAction<S, T, A> = Arc<
    dyn for<'a> Fn(Invocation<'a, S, T, A>) -> BoxFuture<'static, ActionResult> + Send + Sync,
>;

/// Execution mode plus callable.
pub enum Callable<S, T, A> {
    Sync(SyncAction<S, T, A>),
    Async(AsyncAction<S, T, A>),
}

impl<S, T, A> Clone for Callable<S, T, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(action) => Self::Sync(Arc::clone(action)),
            Self::Async(action) => Self::Async(Arc::clone(action)),
        }
    }
}

/// A user action bound to a state slot.
pub struct ActionBehavior<S, T, A> {
    kind: ActionKind,
    state: S,
    callable: Callable<S, T, A>,
    description: InvocationInfo,
    from_trigger: Option<T>,
}

impl<S: State, T: Trigger, A: Args> ActionBehavior<S, T, A> {
    /// Build from an already wrapped callable.
    pub fn from_callable(
        kind: ActionKind,
        state: S,
        callable: Callable<S, T, A>,
        description: InvocationInfo,
    ) -> Self {
        Self {
            kind,
            state,
            callable,
            description,
            from_trigger: None,
        }
    }

    /// Entry or internal action run synchronously with the transition and args.
    pub fn with_transition<F>(
        kind: ActionKind,
        state: S,
        action: F,
        description: Option<&str>,
        default_description: &str,
    ) -> Self
    where
        F: Fn(&Transition<S, T>, &A) -> ActionResult + Send + Sync + 'static,
    {
        let info = InvocationInfo::of(&action, description, Timing::Synchronous, default_description);
        let callable = Callable::Sync(Arc::new(move |invocation: Invocation<'_, S, T, A>| {
            match invocation {
                Invocation::Transition { transition, args } => action(transition, args),
                Invocation::Activation => Ok(()),
            }
        }));
        Self::from_callable(kind, state, callable, info)
    }

    /// Suspension-capable counterpart of [`ActionBehavior::with_transition`].
    pub fn with_transition_async<F, Fut>(
        kind: ActionKind,
        state: S,
        action: F,
        description: Option<&str>,
        default_description: &str,
    ) -> Self
    where
        F: Fn(Transition<S, T>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let info =
            InvocationInfo::of(&action, description, Timing::Asynchronous, default_description);
        let callable = Callable::Async(Arc::new(move |invocation: Invocation<'_, S, T, A>| {
            match invocation {
                Invocation::Transition { transition, args } => {
                    action(transition.clone(), args.clone()).boxed()
                }
                Invocation::Activation => future::ready(Ok(())).boxed(),
            }
        }));
        Self::from_callable(kind, state, callable, info)
    }

    /// Exit action; sees the transition but not the fire arguments.
    pub fn exit<F>(state: S, action: F, description: Option<&str>, default_description: &str) -> Self
    where
        F: Fn(&Transition<S, T>) -> ActionResult + Send + Sync + 'static,
    {
        let info = InvocationInfo::of(&action, description, Timing::Synchronous, default_description);
        let callable = Callable::Sync(Arc::new(move |invocation: Invocation<'_, S, T, A>| {
            match invocation {
                Invocation::Transition { transition, .. } => action(transition),
                Invocation::Activation => Ok(()),
            }
        }));
        Self::from_callable(ActionKind::Exit, state, callable, info)
    }

    pub fn exit_async<F, Fut>(
        state: S,
        action: F,
        description: Option<&str>,
        default_description: &str,
    ) -> Self
    where
        F: Fn(Transition<S, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let info =
            InvocationInfo::of(&action, description, Timing::Asynchronous, default_description);
        let callable = Callable::Async(Arc::new(move |invocation: Invocation<'_, S, T, A>| {
            match invocation {
                Invocation::Transition { transition, .. } => action(transition.clone()).boxed(),
                Invocation::Activation => future::ready(Ok(())).boxed(),
            }
        }));
        Self::from_callable(ActionKind::Exit, state, callable, info)
    }

    /// Activate or deactivate action; takes nothing.
    pub fn activation<F>(
        kind: ActionKind,
        state: S,
        action: F,
        description: Option<&str>,
        default_description: &str,
    ) -> Self
    where
        F: Fn() -> ActionResult + Send + Sync + 'static,
    {
        let info = InvocationInfo::of(&action, description, Timing::Synchronous, default_description);
        let callable =
            Callable::Sync(Arc::new(move |_: Invocation<'_, S, T, A>| action()));
        Self::from_callable(kind, state, callable, info)
    }

    pub fn activation_async<F, Fut>(
        kind: ActionKind,
        state: S,
        action: F,
        description: Option<&str>,
        default_description: &str,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let info =
            InvocationInfo::of(&action, description, Timing::Asynchronous, default_description);
        let callable =
            Callable::Async(Arc::new(move |_: Invocation<'_, S, T, A>| action().boxed()));
        Self::from_callable(kind, state, callable, info)
    }

    /// Restrict an entry action to transitions fired by `trigger`.
    pub fn only_from(mut self, trigger: T) -> Self {
        self.from_trigger = Some(trigger);
        self
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn description(&self) -> &InvocationInfo {
        &self.description
    }

    pub fn from_trigger(&self) -> Option<&T> {
        self.from_trigger.as_ref()
    }

    pub fn is_async(&self) -> bool {
        matches!(self.callable, Callable::Async(_))
    }

    /// False if the action is restricted to another trigger than the one
    /// that fired `transition`.
    pub(crate) fn applies_to(&self, transition: &Transition<S, T>) -> bool {
        self.from_trigger
            .as_ref()
            .is_none_or(|only| transition.trigger() == only)
    }

    fn skips(&self, invocation: &Invocation<'_, S, T, A>) -> bool {
        match invocation {
            Invocation::Transition { transition, .. } => !self.applies_to(transition),
            Invocation::Activation => false,
        }
    }

    /// Context for the error raised when this behavior is driven synchronously.
    pub(crate) fn mode_context(&self) -> String {
        format!(
            "Cannot execute asynchronous action '{}' specified in {} for '{:?}' state synchronously",
            self.description.description(),
            self.kind,
            self.state
        )
    }

    /// Run to completion on the caller's thread.
    pub fn execute(&self, invocation: Invocation<'_, S, T, A>) -> Result<(), MachineError> {
        if self.skips(&invocation) {
            return Ok(());
        }

        match &self.callable {
            Callable::Sync(action) => action(invocation).map_err(MachineError::from),
            Callable::Async(_) => Err(MachineError::InvalidMode {
                context: self.mode_context(),
            }),
        }
    }

    /// Run, awaiting suspension-capable callables. Synchronous callables
    /// complete immediately.
    pub async fn execute_async(
        &self,
        invocation: Invocation<'_, S, T, A>,
    ) -> Result<(), MachineError> {
        if self.skips(&invocation) {
            return Ok(());
        }

        match &self.callable {
            Callable::Sync(action) => action(invocation).map_err(MachineError::from),
            Callable::Async(action) => action(invocation).await.map_err(MachineError::from),
        }
    }
}

impl<S: Clone, T: Clone, A> Clone for ActionBehavior<S, T, A> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            state: self.state.clone(),
            callable: self.callable.clone(),
            description: self.description.clone(),
            from_trigger: self.from_trigger.clone(),
        }
    }
}
