//! Plan reconciliation: the review loop and the final tally.
//!
//! During review the user marks accepted meals to drop. Confirming the
//! marks retracts them all at once; the count becomes the scoped target
//! for the next pass through the deck.

use std::collections::BTreeSet;

use tracing::info;

use crate::error::{NotReady, PlanError};
use crate::goal::GoalTracker;
use crate::ledger::SwipeLedger;
use crate::model::{FinalPlan, SwipeDecision};

/// Holds the retraction set for one review.
#[derive(Debug, Clone, Default)]
pub struct PlanReconciler {
    marked: BTreeSet<String>,
}

impl PlanReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the accepted decisions, for display and selection.
    pub fn enter_review(&self, ledger: &SwipeLedger) -> Vec<SwipeDecision> {
        ledger.accepted().cloned().collect()
    }

    /// Marks an accepted meal for removal.
    pub fn mark(&mut self, ledger: &SwipeLedger, meal_id: &str) -> Result<(), PlanError> {
        if !ledger.is_accepted(meal_id) {
            return Err(PlanError::NotAccepted(meal_id.to_string()));
        }
        self.marked.insert(meal_id.to_string());
        Ok(())
    }

    /// Unmarks a meal. Unmarking something not marked is a no-op.
    pub fn unmark(&mut self, meal_id: &str) {
        self.marked.remove(meal_id);
    }

    /// Drops every mark without touching the ledger.
    pub fn cancel(&mut self) {
        self.marked.clear();
    }

    pub fn marked(&self) -> impl Iterator<Item = &str> {
        self.marked.iter().map(String::as_str)
    }

    pub fn pending(&self) -> usize {
        self.marked.len()
    }

    /// Retracts every marked meal and returns how many were removed.
    ///
    /// All or nothing: the retractions are staged on a copy of the ledger
    /// and committed only if every one succeeds. On failure the ledger and
    /// the marks are left as they were.
    pub fn confirm(&mut self, ledger: &mut SwipeLedger) -> Result<usize, PlanError> {
        let mut staged = ledger.clone();
        for meal_id in &self.marked {
            if !staged.is_accepted(meal_id) {
                return Err(PlanError::ReconciliationFailed(format!(
                    "meal {meal_id} is no longer accepted"
                )));
            }
            staged
                .retract(meal_id)
                .map_err(|e| PlanError::ReconciliationFailed(e.to_string()))?;
        }

        let count = self.marked.len();
        *ledger = staged;
        self.marked.clear();
        info!(count, "retractions confirmed");
        Ok(count)
    }

    /// Tallies the accepted decisions into the final plan.
    ///
    /// Requires an empty retraction set and a satisfied goal.
    pub fn finalize(&self, ledger: &SwipeLedger, goal: &GoalTracker) -> Result<FinalPlan, PlanError> {
        if !self.marked.is_empty() {
            return Err(PlanError::PlanNotReady(NotReady::PendingRetractions(
                self.marked.len(),
            )));
        }
        if goal.target() == 0 {
            return Err(PlanError::PlanNotReady(NotReady::NoTarget));
        }
        if !goal.is_satisfied(ledger) {
            return Err(PlanError::PlanNotReady(NotReady::GoalUnsatisfied {
                remaining: goal.remaining(ledger),
            }));
        }
        Ok(FinalPlan::tally(ledger.accepted()))
    }
}
