//! CLI interface for Mealswipe.
//!
//! Each subcommand is non-interactive: arguments in, plain text out. A plan
//! session is re-hydrated from storage on every invocation, driven by one
//! operation, and written back.
//!
//! Commands split into two groups:
//!
//! - `mealswipe catalog` and `mealswipe session new|list`: no session needed.
//! - `mealswipe --session <id> <command>`: everything else, operating within
//!   a session.
//!
//! The `--session` flag takes a full UUID or unambiguous prefix.

mod format;
mod review;
mod session;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::deck::DeckPolicy;
use crate::model::{Direction, MealCategory, SessionRecord, SwipeDecision};
use crate::outbox::Outbox;
use crate::plan_session::PlanSession;
use crate::storage::Storage;

use format::{format_meal_line, short_id};
pub use review::ReviewCommand;
pub use session::SessionCommand;

/// Mealswipe: swipe through meals until the week is planned.
#[derive(Debug, Parser)]
#[command(name = "mealswipe", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Session ID: full UUID or unambiguous prefix (e.g. `a3b`).
    /// Required for every command except `catalog` and `session`.
    #[arg(long, global = true)]
    session: Option<String>,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: planning a week
  1. mealswipe session new --target 5
     → prints a session ID (e.g. a3b0fc12)
  2. mealswipe --session a3b next
  3. mealswipe --session a3b swipe lunch_3 accept --strength 4
     ... repeat until the goal is met
  4. mealswipe --session a3b review
  5. mealswipe --session a3b review remove lunch_3 dinner_1
     → swipe two more
  6. mealswipe --session a3b finalize

Out of meals before the goal is met:
  mealswipe --session a3b settle";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the meals in the configured catalog.
    Catalog {
        /// Only this category.
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// Manage sessions: create new ones, list existing.
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Show goal progress and the next candidate.
    Status,

    /// Show the next meal to decide on.
    Next,

    /// Decide on the current candidate.
    ///
    /// The meal must be the one `next` shows.
    Swipe {
        /// Meal ID of the current candidate.
        meal: String,

        #[arg(value_enum)]
        direction: DirectionArg,

        /// How strongly, 1 to 5. Defaults to 3.
        #[arg(long)]
        strength: Option<u8>,
    },

    /// Review accepted meals, optionally removing some.
    Review {
        #[command(subcommand)]
        command: Option<ReviewCommand>,
    },

    /// Change the weekly target.
    Target {
        /// Number of meals to accept, 0 to 21.
        count: usize,
    },

    /// Lower the goal to the meals already accepted.
    Settle,

    /// Confirm the plan and close the session.
    Finalize,
}

/// CLI-facing swipe direction, mapped to the domain `Direction`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    /// Add to the plan.
    Accept,
    /// Not this week.
    Reject,
    /// Maybe later.
    Defer,
}

impl DirectionArg {
    fn to_domain(self) -> Direction {
        match self {
            Self::Accept => Direction::Accept,
            Self::Reject => Direction::Reject,
            Self::Defer => Direction::Defer,
        }
    }
}

/// CLI-facing meal category, mapped to the domain `MealCategory`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Breakfast,
    Lunch,
    Dinner,
}

impl CategoryArg {
    fn to_domain(self) -> MealCategory {
        match self {
            Self::Breakfast => MealCategory::Breakfast,
            Self::Lunch => MealCategory::Lunch,
            Self::Dinner => MealCategory::Dinner,
        }
    }
}

/// CLI-facing deck policy, mapped to the domain `DeckPolicy`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// One shuffled deck across all categories.
    Combined,
    /// Breakfast, then lunch, then dinner.
    Phased,
}

impl PolicyArg {
    fn to_domain(self) -> DeckPolicy {
        match self {
            Self::Combined => DeckPolicy::Combined,
            Self::Phased => DeckPolicy::Phased,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: Cli, config: &Config, storage: &Storage) -> Result<(), String> {
    let session_ref = cli.session.as_deref();
    match cli.command {
        Command::Catalog { category } => cmd_catalog(config, category.map(CategoryArg::to_domain)),
        Command::Session { command } => session::run(command, config, storage),
        Command::Status => with_session(config, storage, session_ref, session::cmd_status),
        Command::Next => with_session(config, storage, session_ref, session::cmd_next),
        Command::Swipe {
            meal,
            direction,
            strength,
        } => with_session(config, storage, session_ref, |plan| {
            session::cmd_swipe(plan, &meal, direction.to_domain(), strength)
        }),
        Command::Review { command } => with_session(config, storage, session_ref, |plan| {
            review::run(plan, command)
        }),
        Command::Target { count } => with_session(config, storage, session_ref, |plan| {
            session::cmd_target(plan, count)
        }),
        Command::Settle => with_session(config, storage, session_ref, session::cmd_settle),
        Command::Finalize => with_session(config, storage, session_ref, session::cmd_finalize),
    }
}

/// Opens the referenced session, runs `f` against it, and saves it back
/// whether or not `f` succeeded.
fn with_session<F>(
    config: &Config,
    storage: &Storage,
    session_ref: Option<&str>,
    f: F,
) -> Result<(), String>
where
    F: FnOnce(&mut PlanSession) -> Result<(), String>,
{
    let record = require_session(storage, session_ref)?;
    let mut plan = open_session(config, storage, record)?;
    let result = f(&mut plan);
    close_session(storage, plan)?;
    result
}

fn cmd_catalog(config: &Config, category: Option<MealCategory>) -> Result<(), String> {
    let catalog = Catalog::fetch(config.catalog_provider().as_ref())
        .map_err(|e| format!("failed to load catalog: {e}"))?;

    for meal in catalog.meals() {
        if category.is_none_or(|c| c == meal.category) {
            println!("{}", format_meal_line(meal));
        }
    }
    Ok(())
}

/// Require that `--session` was provided and resolve it.
fn require_session(storage: &Storage, session_ref: Option<&str>) -> Result<SessionRecord, String> {
    let session_ref = session_ref.ok_or("this command requires --session <id>")?;
    resolve_session(storage, session_ref)
}

/// Re-hydrates a plan session: catalog, active decisions, outbox to storage.
fn open_session(
    config: &Config,
    storage: &Storage,
    record: SessionRecord,
) -> Result<PlanSession, String> {
    let decisions: Vec<SwipeDecision> = storage
        .load_active_decisions(record.id)
        .map_err(|e| format!("failed to load decisions: {e}"))?
        .into_iter()
        .map(|r| r.into_decision())
        .collect();
    let outbox = Outbox::spawn(storage.clone())
        .map_err(|e| format!("failed to start background writer: {e}"))?;

    PlanSession::open(
        record,
        config.catalog_provider().as_ref(),
        decisions,
        outbox,
    )
    .map_err(|e| format!("failed to open session: {e}"))
}

/// Drains queued writes, then saves the session header.
fn close_session(storage: &Storage, plan: PlanSession) -> Result<(), String> {
    let record = plan.record().clone();
    let failed = plan.shutdown();
    if failed > 0 {
        eprintln!("warning: {failed} write(s) could not be saved");
    }
    storage
        .update_session(&record)
        .map_err(|e| format!("failed to save session: {e}"))
}

/// Resolve a session reference (full UUID or unambiguous prefix) to a session.
fn resolve_session(storage: &Storage, reference: &str) -> Result<SessionRecord, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_session(id)
            .map_err(|e| format!("session not found: {e}"));
    }

    // Try as a prefix match against all sessions.
    let sessions = storage
        .list_sessions()
        .map_err(|e| format!("failed to list sessions: {e}"))?;

    let matches: Vec<&SessionRecord> = sessions
        .iter()
        .filter(|s| s.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no session matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches.iter().map(|s| short_id(s.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {n} sessions: {}",
                ids.join(", ")
            ))
        }
    }
}
