//! The swipe ledger: the authoritative record of decisions.
//!
//! Holds at most one active decision per meal. Re-deciding a meal
//! requires retracting first, so the ledger never carries duplicates.
//! Goals are computed elsewhere; the ledger only answers what is decided.

use std::collections::HashSet;

use crate::error::PlanError;
use crate::model::{Direction, Meal, Strength, SwipeDecision};

/// Ordered record of active decisions.
#[derive(Debug, Clone, Default)]
pub struct SwipeLedger {
    entries: Vec<SwipeDecision>,
    decided: HashSet<String>,
    generation: u64,
}

impl SwipeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from previously persisted decisions, in order.
    ///
    /// Fails with `DuplicateDecision` if two decisions name the same meal.
    pub fn from_decisions(decisions: impl IntoIterator<Item = SwipeDecision>) -> Result<Self, PlanError> {
        let mut ledger = Self::new();
        for decision in decisions {
            ledger.insert(decision)?;
        }
        Ok(ledger)
    }

    /// Appends a decision on `meal`.
    ///
    /// `strength` defaults to 3 when omitted. Validation happens before any
    /// mutation: a failed call leaves the ledger unchanged.
    pub fn record(
        &mut self,
        meal: &Meal,
        direction: Direction,
        strength: Option<u8>,
    ) -> Result<&SwipeDecision, PlanError> {
        let strength = Strength::or_default(strength)?;
        self.insert(SwipeDecision::new(meal, direction, strength))
    }

    fn insert(&mut self, decision: SwipeDecision) -> Result<&SwipeDecision, PlanError> {
        if self.decided.contains(&decision.meal_id) {
            return Err(PlanError::DuplicateDecision(decision.meal_id));
        }
        self.decided.insert(decision.meal_id.clone());
        self.entries.push(decision);
        self.generation += 1;
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Removes the active decision for `meal_id`, returning it.
    pub fn retract(&mut self, meal_id: &str) -> Result<SwipeDecision, PlanError> {
        let Some(pos) = self.entries.iter().position(|d| d.meal_id == meal_id) else {
            return Err(PlanError::NotFound(meal_id.to_string()));
        };
        self.decided.remove(meal_id);
        self.generation += 1;
        Ok(self.entries.remove(pos))
    }

    /// Accepted decisions in insertion order.
    pub fn accepted(&self) -> impl Iterator<Item = &SwipeDecision> {
        self.entries.iter().filter(|d| d.is_accept())
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted().count()
    }

    /// Meal ids that currently have an active decision.
    pub fn decided_ids(&self) -> HashSet<&str> {
        self.decided.iter().map(String::as_str).collect()
    }

    pub fn is_decided(&self, meal_id: &str) -> bool {
        self.decided.contains(meal_id)
    }

    pub fn is_accepted(&self, meal_id: &str) -> bool {
        self.get(meal_id).is_some_and(SwipeDecision::is_accept)
    }

    pub fn get(&self, meal_id: &str) -> Option<&SwipeDecision> {
        self.entries.iter().find(|d| d.meal_id == meal_id)
    }

    /// Every active decision in insertion order.
    pub fn decisions(&self) -> &[SwipeDecision] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped on every record and retraction.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
