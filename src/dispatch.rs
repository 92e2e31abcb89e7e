//! Dispatcher-facing boundary types.
//!
//! The watch/dispatch machinery lives outside this crate; it invokes
//! [`crate::reconcile::Reconciler::reconcile`] at-least-once per change to a
//! watched intent (or to a workload/artifact it owns) and re-invokes on
//! error. These are the types crossing that boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identity of the intent object a dispatch invocation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Terminal outcome of one successful reconciliation pass.
///
/// Errors are not represented here: a failed pass returns `Err` from
/// `reconcile` and relies on the dispatcher's redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Artifact synced, sidecar attached, status recorded.
    Applied,
    /// The guard found enforcement already active; at most a status
    /// correction was written.
    AlreadyApplied,
    /// The intent disappeared before the pass started; silent no-op.
    IntentGone,
}

impl ReconcileOutcome {
    /// Delay after which the dispatcher should re-invoke, if any.
    ///
    /// This core never schedules its own follow-ups (no timers); convergence
    /// is driven entirely by watch events and error redelivery.
    pub fn requeue_after(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_name_displays_as_slash_pair() {
        let key = NamespacedName::new("default", "api");
        assert_eq!(key.to_string(), "default/api");
    }

    #[test]
    fn no_outcome_requests_a_delayed_requeue() {
        for outcome in [
            ReconcileOutcome::Applied,
            ReconcileOutcome::AlreadyApplied,
            ReconcileOutcome::IntentGone,
        ] {
            assert_eq!(outcome.requeue_after(), None);
        }
    }
}
