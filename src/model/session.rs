//! Session records: what persists about a plan session between runs.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WeekKey;
use crate::deck::DeckPolicy;

/// The persisted header of a plan session.
///
/// Decisions are stored separately; together they re-hydrate a
/// [`PlanSession`](crate::PlanSession).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,

    /// Who is planning. `demo-user` when anonymous.
    pub user_id: String,

    pub week: WeekKey,

    /// Number of accepts the current goal asks for.
    pub target: usize,

    /// Accepted count when a scoped re-swipe began, if one is active.
    pub scope_baseline: Option<usize>,

    pub policy: DeckPolicy,

    /// Seeds deck shuffles so a resumed session sees the same order.
    pub seed: u64,

    pub created_at: Timestamp,

    pub status: SessionStatus,
}

/// Where a session stands in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Swiping or reviewing.
    Active,

    /// The plan was finalized.
    Closed { closed_at: Timestamp },
}

impl SessionRecord {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}
