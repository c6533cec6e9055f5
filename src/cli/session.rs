//! Session commands: lifecycle (new, list) and the swipe loop.

use clap::Subcommand;
use jiff::{Timestamp, Zoned, civil::Date};
use uuid::Uuid;

use crate::config::Config;
use crate::goal::check_target;
use crate::identity::resolve_user_id;
use crate::model::{Direction, SessionRecord, SessionStatus, WeekKey};
use crate::plan_session::PlanSession;
use crate::session::{Outcome, SessionState};
use crate::storage::Storage;

use super::PolicyArg;
use super::format::{format_candidate, format_outcome, format_plan, format_progress, short_id};

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Create a new plan session. Prints the session ID.
    New {
        /// User planning this week. Falls back to `MEALSWIPE_USER`, the
        /// config file, then `demo-user`.
        #[arg(long = "as")]
        user: Option<String>,

        /// Number of meals to accept, 0 to 21. Defaults to the config's
        /// `default-target`.
        #[arg(long)]
        target: Option<usize>,

        /// Any date in the week to plan (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        week: Option<Date>,

        /// Deck ordering. Defaults to the config's `deck-policy`.
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },

    /// List sessions.
    List,
}

pub(super) fn run(command: SessionCommand, config: &Config, storage: &Storage) -> Result<(), String> {
    match command {
        SessionCommand::New {
            user,
            target,
            week,
            policy,
        } => cmd_new(config, storage, user.as_deref(), target, week, policy),
        SessionCommand::List => cmd_list(storage),
    }
}

fn cmd_new(
    config: &Config,
    storage: &Storage,
    user: Option<&str>,
    target: Option<usize>,
    week: Option<Date>,
    policy: Option<PolicyArg>,
) -> Result<(), String> {
    let target = target.unwrap_or(config.default_target);
    check_target(target).map_err(|e| e.to_string())?;

    let day = week.unwrap_or_else(|| Zoned::now().date());
    let week = WeekKey::starting(day).map_err(|e| format!("invalid week {day}: {e}"))?;

    let record = SessionRecord {
        id: Uuid::new_v4(),
        user_id: resolve_user_id(user, config),
        week,
        target,
        scope_baseline: None,
        policy: policy.map_or(config.deck_policy, PolicyArg::to_domain),
        seed: rand::random(),
        created_at: Timestamp::now(),
        status: SessionStatus::Active,
    };

    storage
        .create_session(&record)
        .map_err(|e| format!("failed to create session: {e}"))?;

    println!("{}", record.id);
    Ok(())
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let sessions = storage
        .list_sessions()
        .map_err(|e| format!("failed to list sessions: {e}"))?;

    if sessions.is_empty() {
        println!("No sessions");
        return Ok(());
    }

    for s in &sessions {
        let status = match s.status {
            SessionStatus::Active => "active",
            SessionStatus::Closed { .. } => "closed",
        };
        println!(
            "{}  [{status}] [{}]  week of {}, {} meals",
            short_id(s.id),
            s.user_id,
            s.week,
            s.target
        );
    }

    Ok(())
}

pub(super) fn cmd_status(plan: &mut PlanSession) -> Result<(), String> {
    let next = plan.current_candidate().map(format_candidate);
    let record = plan.record();
    println!(
        "Session {}  [{}]  week of {}",
        short_id(record.id),
        record.user_id,
        record.week
    );
    let progress = plan.progress();
    println!("{}", format_progress(&progress));
    println!("Deck: {} meal(s) left", progress.cards_left);
    if let Some(next) = next {
        println!("Next: {next}");
    }
    Ok(())
}

pub(super) fn cmd_next(plan: &mut PlanSession) -> Result<(), String> {
    if let Some(meal) = plan.current_candidate() {
        println!("{}", format_candidate(meal));
        return Ok(());
    }

    match plan.state() {
        SessionState::Satisfied => println!("Goal met: review or finalize"),
        SessionState::Closed => println!("Session is closed"),
        SessionState::Idle => println!("Target is 0: nothing to swipe"),
        SessionState::Swiping { .. } => {
            let remaining = plan.progress().remaining;
            println!("Out of meals, {remaining} short of the goal: settle or change the target");
        }
    }
    Ok(())
}

pub(super) fn cmd_swipe(
    plan: &mut PlanSession,
    meal_id: &str,
    direction: Direction,
    strength: Option<u8>,
) -> Result<(), String> {
    let outcome = plan
        .decide(meal_id, direction, strength)
        .map_err(|e| e.to_string())?;

    eprintln!("{direction} {meal_id}");
    println!("{}", format_outcome(&outcome));
    if matches!(outcome, Outcome::Continue { .. })
        && let Some(meal) = plan.current_candidate()
    {
        println!("Next: {}", format_candidate(meal));
    }
    Ok(())
}

pub(super) fn cmd_target(plan: &mut PlanSession, count: usize) -> Result<(), String> {
    plan.set_target(count).map_err(|e| e.to_string())?;
    println!("{}", format_progress(&plan.progress()));
    Ok(())
}

pub(super) fn cmd_settle(plan: &mut PlanSession) -> Result<(), String> {
    if plan.ledger().accepted_count() == 0 {
        return Err("nothing accepted yet: swipe before settling".to_string());
    }
    let accepted = plan.settle().map_err(|e| e.to_string())?;
    println!("Settled for {accepted} meal(s): finalize when ready");
    Ok(())
}

pub(super) fn cmd_finalize(plan: &mut PlanSession) -> Result<(), String> {
    let final_plan = plan.finalize().map_err(|e| e.to_string())?;
    println!("{}", format_plan(&final_plan, plan.catalog()));
    eprintln!(
        "Session {} closed, week of {}",
        short_id(plan.id()),
        plan.record().week
    );
    Ok(())
}
