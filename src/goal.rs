//! Goal tracking: how many more accepts the session needs.
//!
//! Pure derivation from the ledger and a configured target. The only
//! state held here is the target itself and, during a scoped re-swipe,
//! the accepted count the scope started from.

use crate::error::PlanError;
use crate::ledger::SwipeLedger;

/// Total meal slots in a week: three meals a day, seven days.
pub const MAX_WEEKLY_MEALS: usize = 21;

/// Target accepted count for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalTracker {
    target: usize,
    baseline: Option<usize>,
}

impl GoalTracker {
    pub fn new(target: usize) -> Result<Self, PlanError> {
        check_target(target)?;
        Ok(Self {
            target,
            baseline: None,
        })
    }

    /// Restores a persisted goal, including an active scope.
    pub fn restore(target: usize, baseline: Option<usize>) -> Result<Self, PlanError> {
        check_target(target)?;
        Ok(Self { target, baseline })
    }

    /// Replaces the target. Leaves the ledger alone and ends any scope.
    pub fn set_target(&mut self, target: usize) -> Result<(), PlanError> {
        check_target(target)?;
        self.target = target;
        self.baseline = None;
        Ok(())
    }

    /// Starts a scoped goal: `target` accepts counted from the ledger's
    /// current accepted count.
    pub fn scope_to(&mut self, target: usize, ledger: &SwipeLedger) -> Result<(), PlanError> {
        check_target(target)?;
        self.target = target;
        self.baseline = Some(ledger.accepted_count());
        Ok(())
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Accepted count when the current scope began.
    pub fn baseline(&self) -> Option<usize> {
        self.baseline
    }

    pub fn is_scoped(&self) -> bool {
        self.baseline.is_some()
    }

    /// Accepts that count toward the current target.
    pub fn progress(&self, ledger: &SwipeLedger) -> usize {
        ledger
            .accepted_count()
            .saturating_sub(self.baseline.unwrap_or(0))
    }

    pub fn remaining(&self, ledger: &SwipeLedger) -> usize {
        self.target.saturating_sub(self.progress(ledger))
    }

    /// A zero target is never satisfied: there is nothing to satisfy,
    /// and the caller skips swiping instead.
    pub fn is_satisfied(&self, ledger: &SwipeLedger) -> bool {
        self.target > 0 && self.remaining(ledger) == 0
    }
}

/// Fails with `InvalidTarget` unless `target` fits in a week.
pub fn check_target(target: usize) -> Result<(), PlanError> {
    if target > MAX_WEEKLY_MEALS {
        return Err(PlanError::InvalidTarget {
            requested: target,
            max: MAX_WEEKLY_MEALS,
        });
    }
    Ok(())
}
