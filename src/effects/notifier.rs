//! Listeners told about every committed transition.

use crate::core::Transition;
use crate::machine::MachineError;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

pub type SyncListener<S, T> = Arc<dyn Fn(&Transition<S, T>) + Send + Sync>;
pub type AsyncListener<S, T> = Arc<dyn Fn(Transition<S, T>) -> BoxFuture<'static, ()> + Send + Sync>;

/// A registered transition listener.
pub enum Listener<S, T> {
    Sync(SyncListener<S, T>),
    Async(AsyncListener<S, T>),
}

/// Ordered multicast of transition listeners.
///
/// Synchronous dispatch refuses to run while any suspension-capable listener
/// is registered, since it could not await it.
pub struct TransitionNotifier<S, T> {
    listeners: Vec<Listener<S, T>>,
}

impl<S, T> TransitionNotifier<S, T>
where
    S: Clone + Send + 'static,
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn register<F>(&mut self, listener: F)
    where
        F: Fn(&Transition<S, T>) + Send + Sync + 'static,
    {
        self.listeners.push(Listener::Sync(Arc::new(listener)));
    }

    pub fn register_async<F, Fut>(&mut self, listener: F)
    where
        F: Fn(Transition<S, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.listeners
            .push(Listener::Async(Arc::new(move |transition| listener(transition).boxed())));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn has_async_listeners(&self) -> bool {
        self.listeners
            .iter()
            .any(|listener| matches!(listener, Listener::Async(_)))
    }

    pub(crate) fn mode_error() -> MachineError {
        MachineError::InvalidMode {
            context: "Cannot execute asynchronous action specified as OnTransitioned callback synchronously"
                .to_string(),
        }
    }

    /// Call every listener in registration order.
    pub fn invoke(&self, transition: &Transition<S, T>) -> Result<(), MachineError> {
        if self.has_async_listeners() {
            return Err(Self::mode_error());
        }

        for listener in &self.listeners {
            if let Listener::Sync(listener) = listener {
                listener(transition);
            }
        }
        Ok(())
    }

    /// Call the synchronous listeners, then await each suspension-capable
    /// listener in turn.
    pub async fn invoke_async(&self, transition: &Transition<S, T>) {
        for listener in &self.listeners {
            if let Listener::Sync(listener) = listener {
                listener(transition);
            }
        }

        for listener in &self.listeners {
            if let Listener::Async(listener) = listener {
                listener(transition.clone()).await;
            }
        }
    }
}

impl<S, T> Default for TransitionNotifier<S, T>
where
    S: Clone + Send + 'static,
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn coin() -> Transition<&'static str, &'static str> {
        Transition::new("Locked", "Unlocked", "Coin")
    }

    #[test]
    fn sync_listeners_see_the_transition() {
        let log: Log = Arc::default();
        let mut notifier = TransitionNotifier::new();

        for name in ["first", "second"] {
            let log = Arc::clone(&log);
            notifier.register(move |t: &Transition<&'static str, &'static str>| {
                log.lock().push(format!("{name}:{}", t.destination()));
            });
        }

        notifier.invoke(&coin()).unwrap();

        assert_eq!(*log.lock(), vec!["first:Unlocked", "second:Unlocked"]);
    }

    #[test]
    fn sync_invoke_refuses_async_listeners() {
        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        let mut notifier = TransitionNotifier::new();
        notifier.register(move |_: &Transition<&'static str, &'static str>| {
            sink.lock().push("sync".to_string());
        });
        notifier.register_async(|_| async {});

        let error = notifier.invoke(&coin()).unwrap_err();

        assert!(error.is_invalid_mode());
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn async_invoke_runs_sync_then_async_in_order() {
        let log: Log = Arc::default();
        let mut notifier = TransitionNotifier::new();

        let sink = Arc::clone(&log);
        notifier.register_async(move |_| {
            let sink = Arc::clone(&sink);
            async move {
                tokio::task::yield_now().await;
                sink.lock().push("async-1".to_string());
            }
        });
        let sink = Arc::clone(&log);
        notifier.register(move |_: &Transition<&'static str, &'static str>| {
            sink.lock().push("sync".to_string());
        });
        let sink = Arc::clone(&log);
        notifier.register_async(move |_| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().push("async-2".to_string());
            }
        });

        notifier.invoke_async(&coin()).await;

        assert_eq!(*log.lock(), vec!["sync", "async-1", "async-2"]);
        assert_eq!(notifier.len(), 3);
    }

    #[test]
    fn empty_notifier_is_a_no_op() {
        let notifier: TransitionNotifier<&str, &str> = TransitionNotifier::default();

        assert!(notifier.is_empty());
        assert!(notifier.invoke(&coin()).is_ok());
    }
}
