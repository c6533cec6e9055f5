//! Plan session: one user's pass from weekly goal to confirmed plan.
//!
//! Owns everything the swipe session needs, constructed explicitly and torn
//! down with the session: the cached catalog, the ledger, the goal, the
//! controller, the reconciler, and the outbox handle. Every operation
//! completes its in-memory transition before anything is queued for
//! persistence.

use jiff::Timestamp;
use tracing::info;
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogError, CatalogProvider};
use crate::error::{NotReady, PlanError};
use crate::goal::{GoalTracker, check_target};
use crate::ledger::SwipeLedger;
use crate::model::{
    DecisionRecord, Direction, FinalPlan, Meal, SessionRecord, SessionStatus, SwipeDecision,
};
use crate::outbox::{Outbox, OutboxMessage};
use crate::reconcile::PlanReconciler;
use crate::session::{Outcome, SessionController, SessionState};

/// Errors that can occur while opening a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Read-only view of where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub state: SessionState,
    pub target: usize,
    pub accepted: usize,
    pub remaining: usize,
    pub cards_left: usize,
}

/// A live meal-planning session.
#[derive(Debug)]
pub struct PlanSession {
    record: SessionRecord,
    catalog: Catalog,
    ledger: SwipeLedger,
    goal: GoalTracker,
    controller: SessionController,
    reconciler: PlanReconciler,
    outbox: Outbox,
}

impl PlanSession {
    /// Fetches the catalog once from `provider` and re-hydrates the session
    /// from `decisions`, which may be empty for a new session.
    pub fn open(
        record: SessionRecord,
        provider: &dyn CatalogProvider,
        decisions: Vec<SwipeDecision>,
        outbox: Outbox,
    ) -> Result<Self, SessionError> {
        let catalog = Catalog::fetch(provider)?;
        Ok(Self::resume(record, catalog, decisions, outbox)?)
    }

    /// Starts a new session with an empty ledger.
    pub fn start(record: SessionRecord, catalog: Catalog, outbox: Outbox) -> Result<Self, PlanError> {
        Self::resume(record, catalog, Vec::new(), outbox)
    }

    /// Re-hydrates a session from its record and previously persisted
    /// active decisions.
    pub fn resume(
        record: SessionRecord,
        catalog: Catalog,
        decisions: Vec<SwipeDecision>,
        outbox: Outbox,
    ) -> Result<Self, PlanError> {
        let goal = GoalTracker::restore(record.target, record.scope_baseline)?;
        let ledger = SwipeLedger::from_decisions(decisions)?;
        let mut controller = SessionController::new(record.policy, record.seed);
        if record.is_active() {
            controller.sync(&ledger, &goal);
        } else {
            controller.close();
        }

        info!(
            session = %record.id,
            user = %record.user_id,
            week = %record.week,
            decisions = ledger.len(),
            "plan session opened"
        );

        Ok(Self {
            record,
            catalog,
            ledger,
            goal,
            controller,
            reconciler: PlanReconciler::new(),
            outbox,
        })
    }

    pub fn id(&self) -> Uuid {
        self.record.id
    }

    pub fn user_id(&self) -> &str {
        &self.record.user_id
    }

    /// The session header, reflecting the current goal and status.
    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &SwipeLedger {
        &self.ledger
    }

    pub fn goal(&self) -> &GoalTracker {
        &self.goal
    }

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            state: self.controller.state(),
            target: self.goal.target(),
            accepted: self.goal.progress(&self.ledger),
            remaining: self.goal.remaining(&self.ledger),
            cards_left: self.controller.cards_left(&self.ledger),
        }
    }

    /// Outbox deliveries that have failed so far.
    pub fn failed_deliveries(&self) -> usize {
        self.outbox.failed_deliveries()
    }

    // ── Swiping ──

    /// The meal to show next, or `None` (see [`SessionController::current_candidate`]).
    pub fn current_candidate(&mut self) -> Option<&Meal> {
        self.controller
            .current_candidate(&self.catalog, &self.ledger, &self.goal)
    }

    /// Decides the current candidate, then queues the decision for
    /// persistence.
    pub fn decide(
        &mut self,
        meal_id: &str,
        direction: Direction,
        strength: Option<u8>,
    ) -> Result<Outcome, PlanError> {
        let (decision, outcome) = self.controller.decide(
            &self.catalog,
            &mut self.ledger,
            &self.goal,
            meal_id,
            direction,
            strength,
        )?;

        self.outbox.send(OutboxMessage::Decision {
            session_id: self.record.id,
            record: DecisionRecord::new(&self.record.user_id, &decision),
        });
        Ok(outcome)
    }

    /// Replaces the goal mid-session.
    pub fn set_target(&mut self, target: usize) -> Result<(), PlanError> {
        self.ensure_open()?;
        self.goal.set_target(target)?;
        self.sync_goal();
        Ok(())
    }

    /// Lowers the goal to what is already accepted, so an exhausted or
    /// impatient session can be finalized with fewer meals.
    pub fn settle(&mut self) -> Result<usize, PlanError> {
        self.ensure_open()?;
        let accepted = self.ledger.accepted_count();
        self.goal.set_target(accepted)?;
        self.sync_goal();
        info!(accepted, "settled for accepted meals");
        Ok(accepted)
    }

    // ── Review ──

    /// Accepted decisions, for the review screen.
    pub fn enter_review(&self) -> Vec<SwipeDecision> {
        self.reconciler.enter_review(&self.ledger)
    }

    pub fn mark_for_retraction(&mut self, meal_id: &str) -> Result<(), PlanError> {
        self.ensure_open()?;
        self.reconciler.mark(&self.ledger, meal_id)
    }

    pub fn unmark_for_retraction(&mut self, meal_id: &str) {
        self.reconciler.unmark(meal_id);
    }

    pub fn cancel_review(&mut self) {
        self.reconciler.cancel();
    }

    pub fn marked_for_retraction(&self) -> impl Iterator<Item = &str> {
        self.reconciler.marked()
    }

    /// Retracts every marked meal and re-enters swiping scoped to one new
    /// accept per retraction, plus whatever the goal still owed before the
    /// review. Returns the number retracted.
    ///
    /// With nothing marked this is a no-op returning zero.
    pub fn confirm_retractions(&mut self) -> Result<usize, PlanError> {
        self.ensure_open()?;
        let pending = self.reconciler.pending();
        if pending == 0 {
            return Ok(0);
        }
        let owed = self.goal.remaining(&self.ledger);
        check_target(pending + owed)?;

        let marked: Vec<String> = self.reconciler.marked().map(String::from).collect();
        let count = self.reconciler.confirm(&mut self.ledger)?;
        self.goal.scope_to(count + owed, &self.ledger)?;
        self.sync_record();
        self.controller
            .enter_scoped(&self.catalog, &self.ledger, &self.goal);

        let retracted_at = Timestamp::now();
        for meal_id in marked {
            self.outbox.send(OutboxMessage::Retraction {
                session_id: self.record.id,
                meal_id,
                retracted_at,
            });
        }
        Ok(count)
    }

    // ── Confirmation ──

    /// Produces the final plan, closes the session, and queues the plan
    /// for persistence under the session's week key.
    pub fn finalize(&mut self) -> Result<FinalPlan, PlanError> {
        self.ensure_open()?;
        let plan = self.reconciler.finalize(&self.ledger, &self.goal)?;

        self.controller.close();
        self.record.status = SessionStatus::Closed {
            closed_at: Timestamp::now(),
        };
        info!(
            session = %self.record.id,
            meals = plan.total(),
            week = %self.record.week,
            "plan finalized"
        );

        self.outbox.send(OutboxMessage::Plan {
            session_id: self.record.id,
            user_id: self.record.user_id.clone(),
            week: self.record.week.clone(),
            entries: plan.entries(),
        });
        Ok(plan)
    }

    /// Ends the session, draining queued writes. Returns the number of
    /// deliveries that failed over the session's lifetime.
    pub fn shutdown(self) -> usize {
        self.outbox.shutdown()
    }

    fn ensure_open(&self) -> Result<(), PlanError> {
        if self.controller.state() == SessionState::Closed {
            return Err(PlanError::PlanNotReady(NotReady::Closed));
        }
        Ok(())
    }

    fn sync_goal(&mut self) {
        self.sync_record();
        self.controller.sync(&self.ledger, &self.goal);
    }

    fn sync_record(&mut self) {
        self.record.target = self.goal.target();
        self.record.scope_baseline = self.goal.baseline();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::catalog::BundledCatalog;
    use crate::deck::DeckPolicy;
    use crate::model::{MealCategory, WeekKey};
    use crate::outbox::tests::{FailingSink, RecordingSink};

    fn record(target: usize) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            user_id: "demo-user".into(),
            week: WeekKey::new("2026-10-12"),
            target,
            scope_baseline: None,
            policy: DeckPolicy::Combined,
            seed: 17,
            created_at: Timestamp::now(),
            status: SessionStatus::Active,
        }
    }

    fn meal(id: &str) -> Meal {
        Meal {
            id: id.into(),
            name: id.into(),
            category: MealCategory::Lunch,
            image_url: None,
            cuisine: None,
            description: None,
            calories: None,
            cook_time_minutes: None,
            ingredients: vec![],
            instructions: vec![],
        }
    }

    fn session(target: usize, catalog: Catalog) -> (PlanSession, RecordingSink) {
        let sink = RecordingSink::default();
        let outbox = Outbox::spawn(sink.clone()).unwrap();
        let session = PlanSession::start(record(target), catalog, outbox).unwrap();
        (session, sink)
    }

    fn bundled() -> Catalog {
        Catalog::fetch(&BundledCatalog).unwrap()
    }

    /// Swipes the top card, returning its id and the outcome.
    fn swipe(session: &mut PlanSession, direction: Direction) -> (String, Outcome) {
        let id = session.current_candidate().unwrap().id.clone();
        let outcome = session.decide(&id, direction, None).unwrap();
        (id, outcome)
    }

    fn accept_until_satisfied(session: &mut PlanSession) {
        while session.state() != SessionState::Satisfied {
            swipe(session, Direction::Accept);
        }
    }

    #[test]
    fn scenario_a_remaining_counts_down_to_satisfied() {
        let (mut session, _) = session(3, bundled());

        let (_, a1) = swipe(&mut session, Direction::Accept);
        let (_, a2) = swipe(&mut session, Direction::Accept);
        let (_, r3) = swipe(&mut session, Direction::Reject);
        assert_ne!(session.state(), SessionState::Satisfied);
        let (_, a4) = swipe(&mut session, Direction::Accept);

        assert_eq!(a1, Outcome::Continue { remaining: 2 });
        assert_eq!(a2, Outcome::Continue { remaining: 1 });
        assert_eq!(r3, Outcome::Continue { remaining: 1 });
        assert_eq!(a4, Outcome::Satisfied);
        assert_eq!(session.state(), SessionState::Satisfied);
    }

    #[test]
    fn scenario_b_exhausted_but_unsatisfied() {
        let catalog = Catalog::new(vec![meal("m1"), meal("m2"), meal("m3")]).unwrap();
        let (mut session, _) = session(5, catalog);

        swipe(&mut session, Direction::Accept);
        swipe(&mut session, Direction::Accept);
        let (_, last) = swipe(&mut session, Direction::Reject);

        assert_eq!(last, Outcome::Exhausted { remaining: 3 });
        assert!(session.current_candidate().is_none());
        assert!(!session.goal().is_satisfied(session.ledger()));
        assert_eq!(session.progress().remaining, 3);
    }

    #[test]
    fn scenario_b_can_settle_for_fewer() {
        let catalog = Catalog::new(vec![meal("m1"), meal("m2"), meal("m3")]).unwrap();
        let (mut session, _) = session(5, catalog);
        swipe(&mut session, Direction::Accept);
        swipe(&mut session, Direction::Accept);
        swipe(&mut session, Direction::Reject);

        assert_eq!(session.settle().unwrap(), 2);
        assert_eq!(session.state(), SessionState::Satisfied);
        assert_eq!(session.finalize().unwrap().total(), 2);
    }

    #[test]
    fn scenario_c_retractions_scope_the_reswipe() {
        let (mut session, sink) = session(4, bundled());
        accept_until_satisfied(&mut session);

        let accepted = session.enter_review();
        assert_eq!(accepted.len(), 4);
        let dropped = [accepted[0].meal_id.clone(), accepted[2].meal_id.clone()];
        for id in &dropped {
            session.mark_for_retraction(id).unwrap();
        }

        assert_eq!(session.confirm_retractions().unwrap(), 2);
        assert_eq!(session.progress().remaining, 2);
        assert_eq!(session.goal().target(), 2);
        assert_eq!(session.state(), SessionState::Swiping { scoped: true });
        let decided = session.ledger().decided_ids();
        assert!(dropped.iter().all(|id| !decided.contains(id.as_str())));

        let (_, first) = swipe(&mut session, Direction::Accept);
        assert_eq!(first, Outcome::Continue { remaining: 1 });

        session.shutdown();
        let retractions = sink
            .delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|m| matches!(m, OutboxMessage::Retraction { .. }))
            .count();
        assert_eq!(retractions, 2);
    }

    #[test]
    fn scenario_d_duplicate_record_leaves_ledger_unchanged() {
        let mut ledger = SwipeLedger::new();
        ledger.record(&meal("m1"), Direction::Accept, None).unwrap();
        let before = ledger.decisions().to_vec();

        let err = ledger.record(&meal("m1"), Direction::Accept, None).unwrap_err();

        assert_eq!(err, PlanError::DuplicateDecision("m1".into()));
        assert_eq!(ledger.decisions(), before.as_slice());
    }

    #[test]
    fn scenario_e_finalize_after_scoped_reswipe() {
        let (mut session, sink) = session(4, bundled());
        accept_until_satisfied(&mut session);

        let accepted = session.enter_review();
        session.mark_for_retraction(&accepted[1].meal_id).unwrap();
        session.mark_for_retraction(&accepted[3].meal_id).unwrap();
        assert_eq!(
            session.finalize().unwrap_err(),
            PlanError::PlanNotReady(NotReady::PendingRetractions(2))
        );

        session.confirm_retractions().unwrap();
        assert!(matches!(
            session.finalize(),
            Err(PlanError::PlanNotReady(NotReady::GoalUnsatisfied { remaining: 2 }))
        ));

        accept_until_satisfied(&mut session);
        let plan = session.finalize().unwrap();

        assert_eq!(
            usize::try_from(plan.total()).unwrap(),
            session.ledger().accepted_count()
        );
        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(session.record().status, SessionStatus::Closed { .. }));

        session.shutdown();
        let delivered = sink.delivered.lock().unwrap();
        let Some(OutboxMessage::Plan { entries, week, .. }) = delivered.last() else {
            panic!("plan was not queued last");
        };
        assert_eq!(entries.len(), 4);
        assert_eq!(week.as_str(), "2026-10-12");
    }

    #[test]
    fn retracted_meals_return_to_the_deck() {
        let catalog = Catalog::new(vec![meal("m1"), meal("m2")]).unwrap();
        let (mut session, _) = session(2, catalog);
        accept_until_satisfied(&mut session);

        session.mark_for_retraction("m1").unwrap();
        session.confirm_retractions().unwrap();

        assert_eq!(session.current_candidate().map(|m| m.id.as_str()), Some("m1"));
        session.decide("m1", Direction::Accept, Some(5)).unwrap();
        assert_eq!(session.state(), SessionState::Satisfied);
        assert_eq!(session.ledger().accepted_count(), 2);
    }

    #[test]
    fn confirming_nothing_changes_nothing() {
        let (mut session, _) = session(1, bundled());
        accept_until_satisfied(&mut session);

        assert_eq!(session.confirm_retractions().unwrap(), 0);
        assert_eq!(session.state(), SessionState::Satisfied);
        assert_eq!(session.goal().target(), 1);
    }

    #[test]
    fn finalize_twice_is_refused() {
        let (mut session, _) = session(1, bundled());
        accept_until_satisfied(&mut session);
        session.finalize().unwrap();

        assert_eq!(
            session.finalize().unwrap_err(),
            PlanError::PlanNotReady(NotReady::Closed)
        );
        assert!(session.current_candidate().is_none());
    }

    #[test]
    fn zero_target_never_draws_and_never_finalizes() {
        let (mut session, _) = session(0, bundled());

        assert!(session.current_candidate().is_none());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(
            session.finalize().unwrap_err(),
            PlanError::PlanNotReady(NotReady::NoTarget)
        );
    }

    #[test]
    fn second_review_during_reswipe_keeps_the_weekly_total() {
        let (mut session, _) = session(4, bundled());
        accept_until_satisfied(&mut session);

        let accepted = session.enter_review();
        session.mark_for_retraction(&accepted[0].meal_id).unwrap();
        session.mark_for_retraction(&accepted[1].meal_id).unwrap();
        session.confirm_retractions().unwrap();
        let (_, outcome) = swipe(&mut session, Direction::Accept);
        assert_eq!(outcome, Outcome::Continue { remaining: 1 });

        let accepted = session.enter_review();
        assert_eq!(accepted.len(), 3);
        session.mark_for_retraction(&accepted[0].meal_id).unwrap();
        assert_eq!(session.confirm_retractions().unwrap(), 1);

        assert_eq!(session.progress().remaining, 2);
        assert_eq!(session.state(), SessionState::Swiping { scoped: true });

        accept_until_satisfied(&mut session);
        assert_eq!(session.finalize().unwrap().total(), 4);
    }

    #[test]
    fn clearing_the_target_mid_swipe_stops_the_deck() {
        let (mut session, _) = session(3, bundled());
        swipe(&mut session, Direction::Accept);

        session.set_target(0).unwrap();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.current_candidate().is_none());
        assert!(matches!(
            session.decide("dinner_4", Direction::Accept, None),
            Err(PlanError::StaleDecision { current: None, .. })
        ));
        assert_eq!(session.ledger().accepted_count(), 1);

        session.set_target(3).unwrap();
        assert!(session.current_candidate().is_some());
        assert_eq!(session.state(), SessionState::Swiping { scoped: false });
        assert_eq!(session.progress().remaining, 2);
    }

    #[test]
    fn settling_with_nothing_accepted_stops_swiping() {
        let (mut session, _) = session(3, bundled());
        swipe(&mut session, Direction::Reject);

        assert_eq!(session.settle().unwrap(), 0);

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.current_candidate().is_none());
        assert_eq!(
            session.finalize().unwrap_err(),
            PlanError::PlanNotReady(NotReady::NoTarget)
        );
    }

    #[test]
    fn finalized_session_refuses_changes() {
        let (mut session, sink) = session(2, bundled());
        accept_until_satisfied(&mut session);
        session.finalize().unwrap();
        let closed = PlanError::PlanNotReady(NotReady::Closed);

        let accepted = session.enter_review();
        assert_eq!(
            session.mark_for_retraction(&accepted[0].meal_id).unwrap_err(),
            closed
        );
        assert_eq!(session.confirm_retractions().unwrap_err(), closed);
        assert_eq!(session.set_target(5).unwrap_err(), closed);
        assert_eq!(session.settle().unwrap_err(), closed);

        assert_eq!(session.ledger().accepted_count(), 2);
        assert_eq!(session.goal().target(), 2);
        assert_eq!(session.marked_for_retraction().count(), 0);
        assert_eq!(session.state(), SessionState::Closed);

        session.shutdown();
        let delivered = sink.delivered.lock().unwrap();
        assert!(
            !delivered
                .iter()
                .any(|m| matches!(m, OutboxMessage::Retraction { .. }))
        );
        assert!(matches!(delivered.last(), Some(OutboxMessage::Plan { .. })));
    }

    #[test]
    fn failed_persistence_does_not_roll_back() {
        let outbox = Outbox::spawn(FailingSink).unwrap();
        let mut session = PlanSession::start(record(2), bundled(), outbox).unwrap();

        swipe(&mut session, Direction::Accept);
        swipe(&mut session, Direction::Accept);

        assert_eq!(session.state(), SessionState::Satisfied);
        assert_eq!(session.ledger().accepted_count(), 2);
        assert_eq!(session.shutdown(), 2);
    }

    #[test]
    fn decisions_are_queued_with_user_stamp() {
        let (mut session, sink) = session(2, bundled());
        let (id, _) = swipe(&mut session, Direction::Defer);
        session.shutdown();

        let delivered = sink.delivered.lock().unwrap();
        let OutboxMessage::Decision { record, .. } = &delivered[0] else {
            panic!("expected a decision");
        };
        assert_eq!(record.meal_id, id);
        assert_eq!(record.user_id, "demo-user");
        assert_eq!(record.direction, Direction::Defer);
        assert_eq!(record.strength.get(), 3);
    }

    #[test]
    fn resume_restores_satisfaction_and_scope() {
        let catalog = bundled();
        let decisions: Vec<SwipeDecision> = ["breakfast_1", "lunch_1"]
            .iter()
            .map(|id| {
                SwipeDecision::new(
                    catalog.get(id).unwrap(),
                    Direction::Accept,
                    crate::model::Strength::DEFAULT,
                )
            })
            .collect();

        let satisfied = PlanSession::resume(
            record(2),
            catalog.clone(),
            decisions.clone(),
            Outbox::spawn(RecordingSink::default()).unwrap(),
        )
        .unwrap();
        assert_eq!(satisfied.state(), SessionState::Satisfied);

        let mut scoped = record(1);
        scoped.scope_baseline = Some(2);
        let mut resumed = PlanSession::resume(
            scoped,
            catalog,
            decisions,
            Outbox::spawn(RecordingSink::default()).unwrap(),
        )
        .unwrap();
        assert_eq!(resumed.progress().remaining, 1);
        let next = resumed.current_candidate().unwrap().id.clone();
        assert!(next != "breakfast_1" && next != "lunch_1");
        assert_eq!(resumed.state(), SessionState::Swiping { scoped: true });
    }

    #[test]
    fn open_reports_catalog_and_ledger_errors() {
        let missing = crate::catalog::FileCatalog::new("/nonexistent/meals.json");
        let err = PlanSession::open(
            record(2),
            &missing,
            Vec::new(),
            Outbox::spawn(RecordingSink::default()).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Catalog(_)));

        let catalog = bundled();
        let twice = SwipeDecision::new(
            catalog.get("dinner_1").unwrap(),
            Direction::Reject,
            crate::model::Strength::DEFAULT,
        );
        let err = PlanSession::open(
            record(2),
            &BundledCatalog,
            vec![twice.clone(), twice],
            Outbox::spawn(RecordingSink::default()).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Plan(PlanError::DuplicateDecision(id)) if id == "dinner_1"
        ));
    }

    #[test]
    fn resume_with_same_seed_draws_same_card() {
        let catalog = bundled();
        let open = |catalog: &Catalog| {
            PlanSession::resume(
                record(3),
                catalog.clone(),
                Vec::new(),
                Outbox::spawn(RecordingSink::default()).unwrap(),
            )
            .unwrap()
        };

        let mut a = open(&catalog);
        let mut b = open(&catalog);
        assert_eq!(
            a.current_candidate().map(|m| m.id.clone()),
            b.current_candidate().map(|m| m.id.clone())
        );
    }
}
