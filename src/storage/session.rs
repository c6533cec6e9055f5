//! Session storage: create, load, update, and list session headers.

use std::{fs, io};

use rusqlite::Connection;
use uuid::Uuid;

use crate::deck::DeckPolicy;
use crate::model::{SessionRecord, SessionStatus, WeekKey};

use super::{Result, Storage, StorageError, count_from_sql, count_to_sql, parse_timestamp};

impl Storage {
    /// Creates a new session, writing its header to a new `SQLite` file.
    pub fn create_session(&self, session: &SessionRecord) -> Result<()> {
        let conn = self.create_db(session.id)?;
        let (status, closed_at) = serialize_status(&session.status);
        conn.execute(
            "INSERT INTO session
                 (id, user_id, week, target, scope_baseline, policy, seed, created_at, status, closed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                session.id.to_string(),
                &session.user_id,
                session.week.as_str(),
                count_to_sql(session.target, "target")?,
                session
                    .scope_baseline
                    .map(|b| count_to_sql(b, "scope baseline"))
                    .transpose()?,
                session.policy.as_str(),
                session.seed.to_string(),
                session.created_at.to_string(),
                status,
                closed_at,
            ],
        )?;
        Ok(())
    }

    /// Updates a session's goal and status. Identity fields never change.
    pub fn update_session(&self, session: &SessionRecord) -> Result<()> {
        let conn = self.open_db(session.id)?;
        let (status, closed_at) = serialize_status(&session.status);
        let rows = conn.execute(
            "UPDATE session
             SET target = ?1, scope_baseline = ?2, status = ?3, closed_at = ?4
             WHERE id = ?5",
            rusqlite::params![
                count_to_sql(session.target, "target")?,
                session
                    .scope_baseline
                    .map(|b| count_to_sql(b, "scope baseline"))
                    .transpose()?,
                status,
                closed_at,
                session.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::SessionNotFound(session.id));
        }
        Ok(())
    }

    /// Loads a single session's header.
    pub fn load_session(&self, id: Uuid) -> Result<SessionRecord> {
        let conn = self.open_db(id)?;
        load_session_row(&conn)
    }

    /// Lists all sessions by reading each `.sqlite` file in the storage root.
    ///
    /// Unreadable or malformed files are silently skipped.
    pub fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut sessions = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(sessions),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("sqlite") {
                continue;
            }
            let Ok(conn) = Connection::open(&path) else {
                continue;
            };
            if let Ok(s) = load_session_row(&conn) {
                sessions.push(s);
            }
        }
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(sessions)
    }
}

struct SessionRow {
    id: String,
    user_id: String,
    week: String,
    target: i64,
    scope_baseline: Option<i64>,
    policy: String,
    seed: String,
    created_at: String,
    status: String,
    closed_at: Option<String>,
}

/// Reads the single session row from an open connection.
fn load_session_row(conn: &Connection) -> Result<SessionRecord> {
    let row = conn.query_row(
        "SELECT id, user_id, week, target, scope_baseline, policy, seed, created_at, status, closed_at
         FROM session LIMIT 1",
        [],
        |row| {
            Ok(SessionRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                week: row.get(2)?,
                target: row.get(3)?,
                scope_baseline: row.get(4)?,
                policy: row.get(5)?,
                seed: row.get(6)?,
                created_at: row.get(7)?,
                status: row.get(8)?,
                closed_at: row.get(9)?,
            })
        },
    )?;

    let id = row
        .id
        .parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid session id: {e}")))?;
    let policy = DeckPolicy::parse(&row.policy)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown deck policy: {}", row.policy)))?;
    let seed = row
        .seed
        .parse::<u64>()
        .map_err(|e| StorageError::Corrupt(format!("invalid seed: {e}")))?;

    Ok(SessionRecord {
        id,
        user_id: row.user_id,
        week: WeekKey::new(row.week),
        target: count_from_sql(row.target, "target")?,
        scope_baseline: row
            .scope_baseline
            .map(|b| count_from_sql(b, "scope baseline"))
            .transpose()?,
        policy,
        seed,
        created_at: parse_timestamp(&row.created_at, "created_at")?,
        status: deserialize_status(&row.status, row.closed_at.as_deref())?,
    })
}

/// Converts a `SessionStatus` to column values for the session table.
fn serialize_status(status: &SessionStatus) -> (&'static str, Option<String>) {
    match status {
        SessionStatus::Active => ("active", None),
        SessionStatus::Closed { closed_at } => ("closed", Some(closed_at.to_string())),
    }
}

/// Reconstructs a `SessionStatus` from session table column values.
fn deserialize_status(status: &str, closed_at: Option<&str>) -> Result<SessionStatus> {
    match status {
        "active" => Ok(SessionStatus::Active),
        "closed" => {
            let closed_at = closed_at.ok_or_else(|| {
                StorageError::Corrupt("session is closed but closed_at is null".into())
            })?;
            Ok(SessionStatus::Closed {
                closed_at: parse_timestamp(closed_at, "closed_at")?,
            })
        }
        other => Err(StorageError::Corrupt(format!(
            "unknown session status: {other}"
        ))),
    }
}
