//! Local persistence for plan sessions.
//!
//! Each session lives in its own `SQLite` file under the storage root:
//!
//! ```text
//! <root>/<uuid>.sqlite
//!   session        # one row: user, week, goal, deck seed, status
//!   decisions      # every decision, retracted ones kept with retracted_at
//!   plan_entries   # the finalized plan, keyed by week
//! ```

mod decisions;
mod plan;
mod session;

pub use decisions::StoredDecision;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;
use uuid::Uuid;

use crate::outbox::{OutboxMessage, PersistenceSink};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("session already exists: {0}")]
    SessionAlreadyExists(Uuid),

    #[error("corrupt session data: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE session (
        id             TEXT PRIMARY KEY,
        user_id        TEXT NOT NULL,
        week           TEXT NOT NULL,
        target         INTEGER NOT NULL,
        scope_baseline INTEGER,
        policy         TEXT NOT NULL,
        seed           TEXT NOT NULL,
        created_at     TEXT NOT NULL,
        status         TEXT NOT NULL,
        closed_at      TEXT
    );

    CREATE TABLE decisions (
        seq          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id      TEXT NOT NULL,
        meal_id      TEXT NOT NULL,
        meal_type    TEXT NOT NULL,
        swipe        TEXT NOT NULL,
        confidence   INTEGER NOT NULL,
        timestamp    TEXT NOT NULL,
        retracted_at TEXT
    );

    CREATE UNIQUE INDEX decisions_active_meal
        ON decisions (meal_id) WHERE retracted_at IS NULL;

    CREATE TABLE plan_entries (
        week         TEXT NOT NULL,
        user_id      TEXT NOT NULL,
        meal_id      TEXT NOT NULL,
        repeat_count INTEGER NOT NULL,
        PRIMARY KEY (week, meal_id)
    );
";

/// Local `SQLite`-backed storage for plan sessions.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.mealswipe/sessions/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".mealswipe").join("sessions"))
    }

    fn db_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.sqlite"))
    }

    /// Creates the database file for a new session and applies the schema.
    fn create_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.db_path(id);
        if path.exists() {
            return Err(StorageError::SessionAlreadyExists(id));
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Opens an existing session's database.
    fn open_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.db_path(id);
        if !path.is_file() {
            return Err(StorageError::SessionNotFound(id));
        }
        Ok(Connection::open(&path)?)
    }
}

impl PersistenceSink for Storage {
    type Error = StorageError;

    fn deliver(&mut self, message: &OutboxMessage) -> Result<()> {
        match message {
            OutboxMessage::Decision { session_id, record } => {
                self.append_decision(*session_id, record)
            }
            OutboxMessage::Retraction {
                session_id,
                meal_id,
                retracted_at,
            } => self.retract_decision(*session_id, meal_id, *retracted_at),
            OutboxMessage::Plan {
                session_id,
                user_id,
                week,
                entries,
            } => self.save_plan(*session_id, user_id, week, entries),
        }
    }
}

/// Converts a count to its column value.
fn count_to_sql(n: usize, what: &str) -> Result<i64> {
    i64::try_from(n).map_err(|_| StorageError::Corrupt(format!("{what} out of range: {n}")))
}

/// Converts a column value back to a count.
fn count_from_sql(n: i64, what: &str) -> Result<usize> {
    usize::try_from(n).map_err(|_| StorageError::Corrupt(format!("invalid {what}: {n}")))
}

fn parse_timestamp(s: &str, what: &str) -> Result<jiff::Timestamp> {
    s.parse()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}
