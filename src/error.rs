//! Errors raised by the swipe session core.
//!
//! Every kind is a local validation or state error. None is fatal:
//! the caller re-reads state and retries the right operation.

/// Errors from ledger, goal, controller, and reconciler operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("meal {0} already has an active decision")]
    DuplicateDecision(String),

    #[error("decision strength must be between 1 and 5, got {0}")]
    InvalidStrength(u8),

    #[error("target must be between 0 and {max}, got {requested}")]
    InvalidTarget { requested: usize, max: usize },

    #[error("meal {meal_id} is not the current candidate{}", describe_current(.current))]
    StaleDecision {
        meal_id: String,
        current: Option<String>,
    },

    #[error("meal {0} is not an accepted decision")]
    NotAccepted(String),

    #[error("no active decision for meal {0}")]
    NotFound(String),

    #[error("retraction batch aborted: {0}")]
    ReconciliationFailed(String),

    #[error("plan is not ready: {0}")]
    PlanNotReady(NotReady),
}

/// Why a plan cannot be finalized yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotReady {
    #[error("{0} meal(s) are marked for removal")]
    PendingRetractions(usize),

    #[error("{remaining} more meal(s) needed")]
    GoalUnsatisfied { remaining: usize },

    #[error("no meals were asked for")]
    NoTarget,

    #[error("the session is closed")]
    Closed,
}

#[allow(clippy::ref_option)]
fn describe_current(current: &Option<String>) -> String {
    match current {
        Some(id) => format!(" (current is {id})"),
        None => " (no card is showing)".to_string(),
    }
}
