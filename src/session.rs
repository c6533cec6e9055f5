//! Session controller: the swipe state machine.
//!
//! ```text
//! Idle ──draw──▶ Swiping ──goal met──▶ Satisfied ──finalize──▶ Closed
//!                   ▲                      │
//!                   └──── retractions ─────┘   (Swiping, scoped)
//! ```
//!
//! The controller owns the deck and its cursor. It never holds the ledger
//! or goal; the enclosing plan session lends them per call.

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::deck::{Deck, DeckPolicy};
use crate::error::PlanError;
use crate::goal::GoalTracker;
use crate::ledger::SwipeLedger;
use crate::model::{Direction, Meal, SwipeDecision};

/// Where the swipe session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Configured but no card drawn yet.
    Idle,

    /// Drawing candidates. `scoped` is set during a re-swipe after review.
    Swiping { scoped: bool },

    /// The goal is met; waiting for review or finalization.
    Satisfied,

    /// The plan was finalized.
    Closed,
}

/// What a decision did to the session, reported synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep swiping: more accepts are needed and cards remain.
    Continue { remaining: usize },

    /// The goal was met by this decision.
    Satisfied,

    /// No undecided meals are left but the goal is still short.
    Exhausted { remaining: usize },
}

/// Drives deck traversal toward the goal.
#[derive(Debug, Clone)]
pub struct SessionController {
    state: SessionState,
    deck: Deck,
    policy: DeckPolicy,
    rng: StdRng,
}

impl SessionController {
    pub fn new(policy: DeckPolicy, seed: u64) -> Self {
        Self {
            state: SessionState::Idle,
            deck: Deck::default(),
            policy,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn policy(&self) -> DeckPolicy {
        self.policy
    }

    /// The meal on top of the deck.
    ///
    /// The first draw moves `Idle` to `Swiping`. Returns `None` when the
    /// deck is exhausted, when the goal is already met, and when the target
    /// is zero (nothing to swipe for; the session drops back to `Idle`).
    pub fn current_candidate<'c>(
        &mut self,
        catalog: &'c Catalog,
        ledger: &SwipeLedger,
        goal: &GoalTracker,
    ) -> Option<&'c Meal> {
        match self.state {
            SessionState::Satisfied | SessionState::Closed => return None,
            _ if goal.target() == 0 => {
                self.state = SessionState::Idle;
                return None;
            }
            SessionState::Idle => {
                self.rebuild(catalog, ledger);
                self.state = SessionState::Swiping {
                    scoped: goal.is_scoped(),
                };
                info!(goal = goal.target(), "swiping started");
            }
            SessionState::Swiping { .. } => {
                if self.deck.is_stale(ledger) {
                    self.rebuild(catalog, ledger);
                }
            }
        }
        self.deck.current(ledger).and_then(|id| catalog.get(id))
    }

    /// Records a decision on the current candidate.
    ///
    /// `meal_id` must name the card currently on top; anything else fails
    /// with `StaleDecision` and changes nothing. On success the cursor
    /// advances and the goal is re-evaluated.
    pub fn decide(
        &mut self,
        catalog: &Catalog,
        ledger: &mut SwipeLedger,
        goal: &GoalTracker,
        meal_id: &str,
        direction: Direction,
        strength: Option<u8>,
    ) -> Result<(SwipeDecision, Outcome), PlanError> {
        let current = self.current_candidate(catalog, ledger, goal);
        let Some(meal) = current.filter(|m| m.id == meal_id) else {
            return Err(PlanError::StaleDecision {
                meal_id: meal_id.to_string(),
                current: current.map(|m| m.id.clone()),
            });
        };

        let decision = ledger.record(meal, direction, strength)?.clone();
        debug!(
            meal_id,
            direction = %decision.direction,
            strength = decision.strength.get(),
            "decision recorded"
        );

        self.deck.advance(ledger);
        Ok((decision, self.evaluate(ledger, goal)))
    }

    /// Re-checks the goal after it changed outside a decision.
    ///
    /// A zero target sends the session back to `Idle`.
    pub fn sync(&mut self, ledger: &SwipeLedger, goal: &GoalTracker) {
        if self.state == SessionState::Closed {
            return;
        }
        if goal.target() == 0 {
            if self.state != SessionState::Idle {
                info!("target cleared, swiping stopped");
                self.state = SessionState::Idle;
            }
            return;
        }
        if goal.is_satisfied(ledger) {
            self.mark_satisfied(goal);
            return;
        }
        match self.state {
            SessionState::Satisfied | SessionState::Swiping { .. } => {
                self.state = SessionState::Swiping {
                    scoped: goal.is_scoped(),
                };
            }
            SessionState::Idle | SessionState::Closed => {}
        }
    }

    /// Re-enters swiping for a scoped goal after retractions.
    pub fn enter_scoped(&mut self, catalog: &Catalog, ledger: &SwipeLedger, goal: &GoalTracker) {
        if self.state == SessionState::Closed {
            return;
        }
        self.rebuild(catalog, ledger);
        self.state = SessionState::Swiping { scoped: true };
        info!(goal = goal.target(), "scoped re-swipe started");
    }

    /// Explicitly rebuilds and reshuffles the deck against the ledger.
    pub fn rebuild(&mut self, catalog: &Catalog, ledger: &SwipeLedger) {
        self.deck = Deck::build(catalog, ledger, self.policy, &mut self.rng);
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        info!("session closed");
    }

    /// Undecided candidates left in the deck.
    pub fn cards_left(&self, ledger: &SwipeLedger) -> usize {
        self.deck.remaining(ledger)
    }

    fn evaluate(&mut self, ledger: &SwipeLedger, goal: &GoalTracker) -> Outcome {
        if goal.is_satisfied(ledger) {
            self.mark_satisfied(goal);
            return Outcome::Satisfied;
        }
        let remaining = goal.remaining(ledger);
        if self.deck.current(ledger).is_none() {
            info!(remaining, "deck exhausted before goal was met");
            Outcome::Exhausted { remaining }
        } else {
            Outcome::Continue { remaining }
        }
    }

    fn mark_satisfied(&mut self, goal: &GoalTracker) {
        if self.state != SessionState::Satisfied {
            info!(goal = goal.target(), "goal satisfied");
            self.state = SessionState::Satisfied;
        }
    }
}
