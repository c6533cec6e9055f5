//! Decision types: what a user said about a meal, and how strongly.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Meal, MealCategory};
use crate::error::PlanError;

/// Which way a card was swiped.
///
/// Serialized with the store's wire names: `right`, `left`, `maybe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Swiped right: the meal goes into the plan.
    #[serde(rename = "right")]
    Accept,

    /// Swiped left: not this week.
    #[serde(rename = "left")]
    Reject,

    /// Undecided. Counts as seen but not toward the goal.
    #[serde(rename = "maybe")]
    Defer,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "right",
            Self::Reject => "left",
            Self::Defer => "maybe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Self::Accept, Self::Reject, Self::Defer]
            .into_iter()
            .find(|d| d.as_str() == s)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Defer => "defer",
        };
        f.write_str(label)
    }
}

/// How sure the user was about a decision, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Strength(u8);

impl Strength {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Used when the user skips the strength prompt.
    pub const DEFAULT: Self = Self(3);

    /// Validates a raw strength value.
    pub fn new(value: u8) -> Result<Self, PlanError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PlanError::InvalidStrength(value))
        }
    }

    /// Resolves an optional strength, defaulting when omitted.
    pub fn or_default(value: Option<u8>) -> Result<Self, PlanError> {
        value.map_or(Ok(Self::DEFAULT), Self::new)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Strength {
    type Error = PlanError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Strength> for u8 {
    fn from(strength: Strength) -> Self {
        strength.0
    }
}

/// One active decision in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeDecision {
    pub meal_id: String,

    /// Copied from the meal when the decision was made.
    pub category: MealCategory,

    pub direction: Direction,

    pub strength: Strength,

    pub decided_at: Timestamp,
}

impl SwipeDecision {
    /// A decision on `meal`, stamped now.
    pub fn new(meal: &Meal, direction: Direction, strength: Strength) -> Self {
        Self {
            meal_id: meal.id.clone(),
            category: meal.category,
            direction,
            strength,
            decided_at: Timestamp::now(),
        }
    }

    pub fn is_accept(&self) -> bool {
        self.direction == Direction::Accept
    }
}

/// A decision as handed to the persistence collaborator.
///
/// Same data as [`SwipeDecision`], stamped with the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub user_id: String,
    pub meal_id: String,
    #[serde(rename = "meal_type")]
    pub category: MealCategory,
    #[serde(rename = "swipe")]
    pub direction: Direction,
    #[serde(rename = "confidence")]
    pub strength: Strength,
    pub timestamp: Timestamp,
}

impl DecisionRecord {
    pub fn new(user_id: &str, decision: &SwipeDecision) -> Self {
        Self {
            user_id: user_id.to_string(),
            meal_id: decision.meal_id.clone(),
            category: decision.category,
            direction: decision.direction,
            strength: decision.strength,
            timestamp: decision.decided_at,
        }
    }

    /// Drops the user stamp, yielding the ledger form.
    pub fn into_decision(self) -> SwipeDecision {
        SwipeDecision {
            meal_id: self.meal_id,
            category: self.category,
            direction: self.direction,
            strength: self.strength,
            decided_at: self.timestamp,
        }
    }
}
