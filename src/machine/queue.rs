//! Pending triggers awaiting the run-to-completion loop.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Cloneable handle onto a machine's pending-trigger queue.
///
/// Actions cannot borrow the machine while it is firing, so a trigger raised
/// from inside an action is pushed here instead. The machine drains the queue
/// in FIFO order after the current transition has fully completed, before the
/// outermost fire call returns.
///
/// # Example
///
/// ```rust
/// use hierarch::machine::StateMachine;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Light { Off, On, Dimmed }
///
/// let mut machine: StateMachine<Light, &str> = StateMachine::new(Light::Off);
/// let queue = machine.trigger_queue();
/// machine
///     .configure(Light::Off)
///     .permit("switch", Light::On);
/// machine
///     .configure(Light::On)
///     .on_entry(move |_, _| {
///         queue.enqueue("dim");
///         Ok(())
///     }, None)
///     .permit("dim", Light::Dimmed);
///
/// machine.fire("switch").unwrap();
/// assert_eq!(machine.state(), &Light::Dimmed);
/// ```
pub struct TriggerQueue<T, A> {
    pending: Arc<Mutex<VecDeque<(T, A)>>>,
}

impl<T, A> TriggerQueue<T, A> {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Queue `trigger` with default arguments.
    pub fn enqueue(&self, trigger: T)
    where
        A: Default,
    {
        self.enqueue_with(trigger, A::default());
    }

    pub fn enqueue_with(&self, trigger: T, args: A) {
        self.pending.lock().push_back((trigger, args));
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub(crate) fn pop(&self) -> Option<(T, A)> {
        self.pending.lock().pop_front()
    }

    /// Drop every pending trigger; returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut pending = self.pending.lock();
        let dropped = pending.len();
        pending.clear();
        dropped
    }
}

impl<T, A> Clone for TriggerQueue<T, A> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T, A> Default for TriggerQueue<T, A> {
    fn default() -> Self {
        Self::new()
    }
}
