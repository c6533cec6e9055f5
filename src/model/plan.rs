//! Plan types: the confirmed week handed to persistence.

use std::collections::BTreeMap;
use std::fmt;

use jiff::{Span, civil::Date};
use serde::{Deserialize, Serialize};

use super::SwipeDecision;

/// Mapping from meal id to how many times it is cooked this week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPlan {
    counts: BTreeMap<String, u32>,
}

impl FinalPlan {
    /// Tallies accepted decisions by meal id. Non-accepts are ignored.
    pub fn tally<'a>(decisions: impl IntoIterator<Item = &'a SwipeDecision>) -> Self {
        let mut counts = BTreeMap::new();
        for decision in decisions.into_iter().filter(|d| d.is_accept()) {
            *counts.entry(decision.meal_id.clone()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn repeat_count(&self, meal_id: &str) -> u32 {
        self.counts.get(meal_id).copied().unwrap_or(0)
    }

    /// Sum of all repeat counts: the number of meals cooked this week.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The plan as `{mealId, repeatCount}` rows, ordered by meal id.
    pub fn entries(&self) -> Vec<PlanEntry> {
        self.counts
            .iter()
            .map(|(meal_id, &repeat_count)| PlanEntry {
                meal_id: meal_id.clone(),
                repeat_count,
            })
            .collect()
    }
}

/// One row of a persisted plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub meal_id: String,
    pub repeat_count: u32,
}

/// Identifies the week a plan belongs to. Supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekKey(String);

impl WeekKey {
    /// Any caller-chosen key, used verbatim.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key for the week containing `date`: its Monday as an ISO date.
    pub fn starting(date: Date) -> Result<Self, jiff::Error> {
        let offset = date.weekday().to_monday_zero_offset();
        let monday = date.checked_sub(Span::new().days(i64::from(offset)))?;
        Ok(Self(monday.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
