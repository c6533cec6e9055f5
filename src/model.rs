//! Core data model for meal planning.
//!
//! These types represent the swipe session's vocabulary:
//! meals, decisions, plans, and the persisted session record.

mod decision;
mod meal;
mod plan;
mod session;

pub use decision::{DecisionRecord, Direction, Strength, SwipeDecision};
pub use meal::{Meal, MealCategory};
pub use plan::{FinalPlan, PlanEntry, WeekKey};
pub use session::{SessionRecord, SessionStatus};
