//! Review command: list accepted meals, remove some, re-swipe for the gap.

use clap::Subcommand;

use crate::plan_session::PlanSession;

use super::format::{format_decision, format_progress};

#[derive(Debug, Subcommand)]
pub enum ReviewCommand {
    /// Remove accepted meals from the plan.
    ///
    /// All listed meals are removed together or not at all. The session
    /// then asks for exactly that many new accepts.
    Remove {
        /// Meal IDs to remove.
        #[arg(required = true)]
        meals: Vec<String>,
    },
}

pub(super) fn run(plan: &mut PlanSession, command: Option<ReviewCommand>) -> Result<(), String> {
    match command {
        None => cmd_list(plan),
        Some(ReviewCommand::Remove { meals }) => cmd_remove(plan, &meals),
    }
}

fn cmd_list(plan: &PlanSession) -> Result<(), String> {
    let accepted = plan.enter_review();
    if accepted.is_empty() {
        println!("No accepted meals");
        return Ok(());
    }
    for decision in &accepted {
        println!("{}", format_decision(decision, plan.catalog()));
    }
    println!("{}", format_progress(&plan.progress()));
    Ok(())
}

fn cmd_remove(plan: &mut PlanSession, meals: &[String]) -> Result<(), String> {
    for meal_id in meals {
        if let Err(e) = plan.mark_for_retraction(meal_id) {
            plan.cancel_review();
            return Err(e.to_string());
        }
    }

    let removed = plan.confirm_retractions().map_err(|e| {
        plan.cancel_review();
        e.to_string()
    })?;

    eprintln!("Removed {removed} meal(s)");
    println!("{}", format_progress(&plan.progress()));
    Ok(())
}
