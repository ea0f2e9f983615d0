//! Guard predicates for controlling state transitions.
//!
//! A transition guard is an ordered list of conditions over the fire-time
//! arguments. A candidate transition may only be taken when every condition
//! holds; the descriptions of the ones that do not are reported back so an
//! unhandled trigger can say why it was refused.

use super::invocation::{InvocationInfo, Timing, DEFAULT_FUNCTION_DESCRIPTION};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Predicate<A> = Arc<dyn Fn(&A) -> bool + Send + Sync>;

/// One predicate of a [`TransitionGuard`] together with its description.
pub struct GuardCondition<A> {
    predicate: Predicate<A>,
    description: InvocationInfo,
}

impl<A> GuardCondition<A> {
    /// Wrap a predicate. The description defaults to the predicate's name.
    pub fn new<F>(predicate: F, description: Option<&str>, default_description: &str) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let description =
            InvocationInfo::of(&predicate, description, Timing::Synchronous, default_description);
        Self {
            predicate: Arc::new(predicate),
            description,
        }
    }

    pub fn check(&self, args: &A) -> bool {
        (self.predicate)(args)
    }

    pub fn description(&self) -> &InvocationInfo {
        &self.description
    }

    pub(crate) fn with_default_description(mut self, default_description: &str) -> Self {
        self.description = self.description.with_default_description(default_description);
        self
    }
}

impl<A> Clone for GuardCondition<A> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
            description: self.description.clone(),
        }
    }
}

/// Ordered conditions gating a candidate transition.
///
/// The empty guard is always satisfied.
///
/// # Example
///
/// ```rust
/// use hierarch::core::TransitionGuard;
///
/// let guard = TransitionGuard::new(|amount: &u32| *amount >= 50, Some("paid enough"))
///     .and(|amount: &u32| *amount % 10 == 0, Some("whole coins"));
///
/// assert!(guard.guard_conditions_met(&60));
/// assert_eq!(guard.unmet_guard_conditions(&45), vec!["paid enough", "whole coins"]);
/// assert!(TransitionGuard::<u32>::empty().guard_conditions_met(&0));
/// ```
pub struct TransitionGuard<A> {
    conditions: Vec<GuardCondition<A>>,
}

impl<A> TransitionGuard<A> {
    /// The identity guard.
    pub fn empty() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// A guard with a single condition.
    pub fn new<F>(predicate: F, description: Option<&str>) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self::empty().and(predicate, description)
    }

    /// Append a condition. Without a description it falls back to
    /// [`DEFAULT_FUNCTION_DESCRIPTION`] until a machine rebinds it.
    pub fn and<F>(self, predicate: F, description: Option<&str>) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.with_condition(GuardCondition::new(
            predicate,
            description,
            DEFAULT_FUNCTION_DESCRIPTION,
        ))
    }

    /// Rebind conditions still carrying the crate-wide default description
    /// to `default_description`.
    pub fn with_default_description(self, default_description: &str) -> Self {
        Self {
            conditions: self
                .conditions
                .into_iter()
                .map(|condition| condition.with_default_description(default_description))
                .collect(),
        }
    }

    pub fn with_condition(mut self, condition: GuardCondition<A>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[GuardCondition<A>] {
        &self.conditions
    }

    /// True when every condition holds. Stops at the first failing one.
    pub fn guard_conditions_met(&self, args: &A) -> bool {
        self.conditions.iter().all(|condition| condition.check(args))
    }

    /// Descriptions of every condition that does not hold, in order.
    ///
    /// Each predicate is evaluated exactly once.
    pub fn unmet_guard_conditions(&self, args: &A) -> Vec<String> {
        let checks: Vec<Validation<(), NonEmptyVec<String>>> = self
            .conditions
            .iter()
            .map(|condition| {
                if condition.check(args) {
                    Validation::success(())
                } else {
                    Validation::fail(condition.description().description().to_string())
                }
            })
            .collect();

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(unmet) => unmet.iter().cloned().collect(),
        }
    }
}

impl<A> Default for TransitionGuard<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A> Clone for TransitionGuard<A> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
        }
    }
}
