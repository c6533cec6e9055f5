//! Plan storage: the finalized week.

use uuid::Uuid;

use crate::model::{PlanEntry, WeekKey};

use super::{Result, Storage};

impl Storage {
    /// Writes the plan for `week`, replacing any earlier plan for it.
    pub fn save_plan(
        &self,
        session_id: Uuid,
        user_id: &str,
        week: &WeekKey,
        entries: &[PlanEntry],
    ) -> Result<()> {
        let mut conn = self.open_db(session_id)?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM plan_entries WHERE week = ?1",
            [week.as_str()],
        )?;
        for entry in entries {
            tx.execute(
                "INSERT INTO plan_entries (week, user_id, meal_id, repeat_count)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![week.as_str(), user_id, &entry.meal_id, entry.repeat_count],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads the plan saved for `week`, ordered by meal id. Empty if none.
    pub fn load_plan(&self, session_id: Uuid, week: &WeekKey) -> Result<Vec<PlanEntry>> {
        let conn = self.open_db(session_id)?;
        let mut stmt = conn.prepare(
            "SELECT meal_id, repeat_count FROM plan_entries
             WHERE week = ?1 ORDER BY meal_id",
        )?;
        let rows = stmt.query_map([week.as_str()], |row| {
            Ok(PlanEntry {
                meal_id: row.get(0)?,
                repeat_count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::deck::DeckPolicy;
    use crate::model::{SessionRecord, SessionStatus};

    fn setup() -> (TempDir, Storage, SessionRecord) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("sessions")).unwrap();
        let session = SessionRecord {
            id: Uuid::new_v4(),
            user_id: "demo-user".into(),
            week: WeekKey::new("2026-10-12"),
            target: 2,
            scope_baseline: None,
            policy: DeckPolicy::Combined,
            seed: 3,
            created_at: Timestamp::now(),
            status: SessionStatus::Active,
        };
        storage.create_session(&session).unwrap();
        (dir, storage, session)
    }

    fn entry(meal_id: &str, repeat_count: u32) -> PlanEntry {
        PlanEntry {
            meal_id: meal_id.into(),
            repeat_count,
        }
    }

    #[test]
    fn save_and_load_plan() {
        let (_dir, storage, session) = setup();
        storage
            .save_plan(
                session.id,
                "demo-user",
                &session.week,
                &[entry("lunch_3", 1), entry("breakfast_2", 2)],
            )
            .unwrap();

        let plan = storage.load_plan(session.id, &session.week).unwrap();
        assert_eq!(plan, [entry("breakfast_2", 2), entry("lunch_3", 1)]);
    }

    #[test]
    fn saving_again_replaces_the_week() {
        let (_dir, storage, session) = setup();
        storage
            .save_plan(session.id, "demo-user", &session.week, &[entry("lunch_3", 1)])
            .unwrap();
        storage
            .save_plan(session.id, "demo-user", &session.week, &[entry("dinner_5", 1)])
            .unwrap();

        let plan = storage.load_plan(session.id, &session.week).unwrap();
        assert_eq!(plan, [entry("dinner_5", 1)]);
    }

    #[test]
    fn unknown_week_is_empty() {
        let (_dir, storage, session) = setup();
        let plan = storage
            .load_plan(session.id, &WeekKey::new("2026-10-19"))
            .unwrap();
        assert!(plan.is_empty());
    }
}
