//! Mealswipe: a swipe session that turns meal decisions into a weekly plan.
//!
//! The user swipes accept, reject, or defer on meals drawn from a catalog
//! until enough are accepted to meet a weekly goal, reviews the accepted
//! set, removes what they no longer want, re-swipes for exactly the gap,
//! and confirms the week.
//!
//! # Modules
//!
//! - [`ledger`]: one active decision per meal
//! - [`goal`]: how many accepts are still needed
//! - [`deck`]: shuffled ordering of undecided meals
//! - [`session`]: the swipe state machine
//! - [`reconcile`]: review, retraction, and the final tally
//! - [`plan_session`]: everything above, owned by one session object
//! - [`outbox`] and [`storage`]: background persistence to `SQLite`

pub mod catalog;
pub mod cli;
pub mod config;
pub mod deck;
pub mod error;
pub mod goal;
pub mod identity;
pub mod ledger;
pub mod model;
pub mod outbox;
pub mod plan_session;
pub mod reconcile;
pub mod session;
pub mod storage;

pub use catalog::{BundledCatalog, Catalog, CatalogError, CatalogProvider, FileCatalog};
pub use deck::DeckPolicy;
pub use error::{NotReady, PlanError};
pub use goal::{GoalTracker, MAX_WEEKLY_MEALS};
pub use ledger::SwipeLedger;
pub use outbox::{Outbox, OutboxMessage, PersistenceSink};
pub use plan_session::{PlanSession, Progress, SessionError};
pub use reconcile::PlanReconciler;
pub use session::{Outcome, SessionController, SessionState};
