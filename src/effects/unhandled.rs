//! Policy for triggers that no state knows how to handle.

use crate::machine::{ActionResult, MachineError};
use futures::future::{BoxFuture, FutureExt};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

pub type SyncUnhandledAction<S, T> = Arc<dyn Fn(&S, &T, &[String]) -> ActionResult + Send + Sync>;
pub type AsyncUnhandledAction<S, T> =
    Arc<dyn Fn(S, T, Vec<String>) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// What happens when a fired trigger resolves to no behavior.
///
/// The default fails the fire call with [`MachineError::UnhandledTrigger`].
/// A custom handler receives the current state, the trigger and the unmet
/// guard descriptions of the best candidate; returning `Ok` swallows the
/// trigger.
pub enum UnhandledTriggerHandler<S, T> {
    Default,
    Sync(SyncUnhandledAction<S, T>),
    Async(AsyncUnhandledAction<S, T>),
}

impl<S, T> UnhandledTriggerHandler<S, T>
where
    S: Clone + Debug + Send + 'static,
    T: Clone + Debug + Send + 'static,
{
    pub fn sync<F>(handler: F) -> Self
    where
        F: Fn(&S, &T, &[String]) -> ActionResult + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(handler))
    }

    pub fn asynchronous<F, Fut>(handler: F) -> Self
    where
        F: Fn(S, T, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::Async(Arc::new(move |state, trigger, unmet| {
            handler(state, trigger, unmet).boxed()
        }))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    fn default_error(state: &S, trigger: &T, unmet_guards: &[String]) -> MachineError {
        MachineError::UnhandledTrigger {
            state: format!("{state:?}"),
            trigger: format!("{trigger:?}"),
            unmet_guards: unmet_guards.to_vec(),
        }
    }

    pub(crate) fn mode_error() -> MachineError {
        MachineError::InvalidMode {
            context: "Cannot execute asynchronous action specified in OnUnhandledTrigger synchronously"
                .to_string(),
        }
    }

    pub fn execute(&self, state: &S, trigger: &T, unmet_guards: &[String]) -> Result<(), MachineError> {
        match self {
            Self::Default => Err(Self::default_error(state, trigger, unmet_guards)),
            Self::Sync(handler) => handler(state, trigger, unmet_guards).map_err(MachineError::from),
            Self::Async(_) => Err(Self::mode_error()),
        }
    }

    pub async fn execute_async(
        &self,
        state: &S,
        trigger: &T,
        unmet_guards: &[String],
    ) -> Result<(), MachineError> {
        match self {
            Self::Default => Err(Self::default_error(state, trigger, unmet_guards)),
            Self::Sync(handler) => handler(state, trigger, unmet_guards).map_err(MachineError::from),
            Self::Async(handler) => handler(state.clone(), trigger.clone(), unmet_guards.to_vec())
                .await
                .map_err(MachineError::from),
        }
    }
}

impl<S, T> Default for UnhandledTriggerHandler<S, T> {
    fn default() -> Self {
        Self::Default
    }
}
