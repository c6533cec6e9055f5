//! Output formatting for CLI display.

use uuid::Uuid;

use crate::catalog::Catalog;
use crate::model::{FinalPlan, Meal, SwipeDecision};
use crate::plan_session::Progress;
use crate::session::{Outcome, SessionState};

/// First eight characters of a session id.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// One catalog row: id, category, name.
pub(super) fn format_meal_line(meal: &Meal) -> String {
    format!("{:<12} {:<10} {}", meal.id, meal.category, meal.name)
}

/// The meal on offer, with whatever detail the catalog carries.
pub(super) fn format_candidate(meal: &Meal) -> String {
    let mut details = Vec::new();
    if let Some(cuisine) = &meal.cuisine {
        details.push(cuisine.clone());
    }
    if let Some(calories) = meal.calories {
        details.push(format!("{calories} kcal"));
    }
    if let Some(minutes) = meal.cook_time_minutes {
        details.push(format!("{minutes} min"));
    }

    let mut line = format!("{} ({}): {}", meal.id, meal.category, meal.name);
    if !details.is_empty() {
        line.push_str(&format!(" [{}]", details.join(", ")));
    }
    line
}

fn format_state(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Swiping { scoped: false } => "swiping",
        SessionState::Swiping { scoped: true } => "re-swiping",
        SessionState::Satisfied => "goal met",
        SessionState::Closed => "closed",
    }
}

pub(super) fn format_progress(progress: &Progress) -> String {
    format!(
        "Goal: {} of {} accepted, {} remaining [{}]",
        progress.accepted,
        progress.target,
        progress.remaining,
        format_state(progress.state)
    )
}

pub(super) fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Continue { remaining } => format!("{remaining} to go"),
        Outcome::Satisfied => "Goal met: review or finalize".to_string(),
        Outcome::Exhausted { remaining } => {
            format!("Out of meals, {remaining} short of the goal: settle or change the target")
        }
    }
}

/// A review row: meal id, name if the catalog knows it, strength.
pub(super) fn format_decision(decision: &SwipeDecision, catalog: &Catalog) -> String {
    let name = catalog
        .get(&decision.meal_id)
        .map_or("(not in catalog)", |m| m.name.as_str());
    format!(
        "{:<12} {:<10} {}  strength {}",
        decision.meal_id,
        decision.category,
        name,
        decision.strength.get()
    )
}

pub(super) fn format_plan(plan: &FinalPlan, catalog: &Catalog) -> String {
    let mut lines = vec![format!("Plan: {} meal(s)", plan.total())];
    for entry in plan.entries() {
        let name = catalog
            .get(&entry.meal_id)
            .map_or(entry.meal_id.as_str(), |m| m.name.as_str());
        lines.push(format!("  {} x{}", name, entry.repeat_count));
    }
    lines.join("\n")
}
