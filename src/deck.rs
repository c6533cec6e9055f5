//! The deck: session-local ordering of undecided meals.
//!
//! A deck is built from the catalog minus everything already in the
//! ledger, shuffled once per build. It is rebuilt when the ledger changed
//! behind its back, tracked by the ledger's generation so a retraction
//! followed by a new record still counts. The controller's own decisions
//! just advance the cursor.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::ledger::SwipeLedger;
use crate::model::MealCategory;

/// How candidates are ordered within a deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeckPolicy {
    /// One shuffled deck across all categories.
    #[default]
    Combined,

    /// Breakfast first, then lunch, then dinner; shuffled within each.
    Phased,
}

impl DeckPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Phased => "phased",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Self::Combined, Self::Phased]
            .into_iter()
            .find(|p| p.as_str() == s)
    }
}

/// Ordered candidate meal ids with a cursor.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    order: Vec<String>,
    cursor: usize,
    built_against: u64,
}

impl Deck {
    /// Builds a fresh deck of every catalog meal the ledger hasn't decided.
    pub fn build<R: Rng + ?Sized>(
        catalog: &Catalog,
        ledger: &SwipeLedger,
        policy: DeckPolicy,
        rng: &mut R,
    ) -> Self {
        let undecided = catalog
            .meals()
            .iter()
            .filter(|m| !ledger.is_decided(&m.id));

        let order = match policy {
            DeckPolicy::Combined => {
                let mut ids: Vec<String> = undecided.map(|m| m.id.clone()).collect();
                ids.shuffle(rng);
                ids
            }
            DeckPolicy::Phased => {
                let meals: Vec<_> = undecided.collect();
                let mut ids = Vec::with_capacity(meals.len());
                for category in MealCategory::ALL {
                    let mut phase: Vec<String> = meals
                        .iter()
                        .filter(|m| m.category == category)
                        .map(|m| m.id.clone())
                        .collect();
                    phase.shuffle(rng);
                    ids.extend(phase);
                }
                ids
            }
        };

        debug!(
            candidates = order.len(),
            excluded = ledger.len(),
            policy = policy.as_str(),
            "built deck"
        );

        Self {
            order,
            cursor: 0,
            built_against: ledger.generation(),
        }
    }

    /// The next candidate the ledger hasn't decided, if any.
    pub fn current<'a>(&'a self, ledger: &SwipeLedger) -> Option<&'a str> {
        self.order[self.cursor..]
            .iter()
            .map(String::as_str)
            .find(|id| !ledger.is_decided(id))
    }

    /// Moves past the current candidate after it was decided.
    ///
    /// Brings the deck's view of the ledger up to date, so the recorded
    /// decision doesn't trigger a rebuild.
    pub fn advance(&mut self, ledger: &SwipeLedger) {
        while self.cursor < self.order.len() && ledger.is_decided(&self.order[self.cursor]) {
            self.cursor += 1;
        }
        self.built_against = ledger.generation();
    }

    /// Whether the ledger changed since the deck last looked at it.
    pub fn is_stale(&self, ledger: &SwipeLedger) -> bool {
        self.built_against != ledger.generation()
    }

    /// Candidates left, including the current one.
    pub fn remaining(&self, ledger: &SwipeLedger) -> usize {
        self.order[self.cursor..]
            .iter()
            .filter(|id| !ledger.is_decided(id))
            .count()
    }
}
