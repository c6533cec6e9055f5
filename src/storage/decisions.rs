//! Decision storage: append, retract, and load a session's decisions.
//!
//! Retraction marks the row instead of deleting it, so the full history
//! stays on disk. At most one unretracted row exists per meal.

use jiff::Timestamp;
use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{DecisionRecord, Direction, MealCategory, Strength};

use super::{Result, Storage, StorageError, parse_timestamp};

/// A stored decision and when, if ever, it was retracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDecision {
    pub record: DecisionRecord,
    pub retracted_at: Option<Timestamp>,
}

impl Storage {
    /// Appends a decision to the session's ledger.
    pub fn append_decision(&self, session_id: Uuid, record: &DecisionRecord) -> Result<()> {
        let conn = self.open_db(session_id)?;
        conn.execute(
            "INSERT INTO decisions (user_id, meal_id, meal_type, swipe, confidence, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                &record.user_id,
                &record.meal_id,
                record.category.as_str(),
                record.direction.as_str(),
                record.strength.get(),
                record.timestamp.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Marks the meal's active decision as retracted.
    ///
    /// Retracting a meal with no active decision is a no-op.
    pub fn retract_decision(
        &self,
        session_id: Uuid,
        meal_id: &str,
        retracted_at: Timestamp,
    ) -> Result<()> {
        let conn = self.open_db(session_id)?;
        conn.execute(
            "UPDATE decisions SET retracted_at = ?1
             WHERE meal_id = ?2 AND retracted_at IS NULL",
            rusqlite::params![retracted_at.to_string(), meal_id],
        )?;
        Ok(())
    }

    /// Loads the decisions still in effect, in the order they were made.
    pub fn load_active_decisions(&self, session_id: Uuid) -> Result<Vec<DecisionRecord>> {
        let conn = self.open_db(session_id)?;
        Ok(load_rows(&conn, true)?
            .into_iter()
            .map(|stored| stored.record)
            .collect())
    }

    /// Loads every decision ever made in the session, retracted ones included.
    pub fn load_history(&self, session_id: Uuid) -> Result<Vec<StoredDecision>> {
        let conn = self.open_db(session_id)?;
        load_rows(&conn, false)
    }
}

fn load_rows(conn: &Connection, active_only: bool) -> Result<Vec<StoredDecision>> {
    let sql = if active_only {
        "SELECT user_id, meal_id, meal_type, swipe, confidence, timestamp, retracted_at
         FROM decisions WHERE retracted_at IS NULL ORDER BY seq"
    } else {
        "SELECT user_id, meal_id, meal_type, swipe, confidence, timestamp, retracted_at
         FROM decisions ORDER BY seq"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
        ))
    })?;

    let mut decisions = Vec::new();
    for row in rows {
        let (user_id, meal_id, meal_type, swipe, confidence, timestamp, retracted_at) = row?;
        let category = MealCategory::parse(&meal_type)
            .ok_or_else(|| StorageError::Corrupt(format!("unknown meal type: {meal_type}")))?;
        let direction = Direction::parse(&swipe)
            .ok_or_else(|| StorageError::Corrupt(format!("unknown swipe: {swipe}")))?;
        let strength = Strength::new(confidence)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        decisions.push(StoredDecision {
            record: DecisionRecord {
                user_id,
                meal_id,
                category,
                direction,
                strength,
                timestamp: parse_timestamp(&timestamp, "timestamp")?,
            },
            retracted_at: retracted_at
                .as_deref()
                .map(|t| parse_timestamp(t, "retracted_at"))
                .transpose()?,
        });
    }
    Ok(decisions)
}
