use std::collections::HashSet;

use mealswipe::model::{Direction, Meal, MealCategory};
use mealswipe::{
    BundledCatalog, Catalog, GoalTracker, Outbox, OutboxMessage, Outcome, PersistenceSink,
    PlanSession, SessionState, SwipeLedger,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn meal(n: u8) -> Meal {
    let category = MealCategory::ALL[usize::from(n % 3)];
    serde_json::from_value(serde_json::json!({
        "meal_id": format!("m{n}"),
        "name": format!("Meal {n}"),
        "meal_type": category.as_str(),
    }))
    .unwrap()
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Accept),
        Just(Direction::Reject),
        Just(Direction::Defer),
    ]
}

struct NullSink;

impl PersistenceSink for NullSink {
    type Error = String;

    fn deliver(&mut self, _message: &OutboxMessage) -> Result<(), String> {
        Ok(())
    }
}

fn session_record(target: usize, seed: u64) -> mealswipe::model::SessionRecord {
    serde_json::from_value(serde_json::json!({
        "id": "00000000-0000-4000-8000-000000000000",
        "userId": "demo-user",
        "week": "2026-10-12",
        "target": target,
        "scopeBaseline": null,
        "policy": "combined",
        "seed": seed,
        "createdAt": "2026-10-17T12:00:00Z",
        "status": "Active",
    }))
    .unwrap()
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn decided_ids_stay_unique(picks in prop::collection::vec((0_u8..8, direction()), 0..32)) {
        let mut ledger = SwipeLedger::new();
        let mut seen = HashSet::new();

        for (n, direction) in picks {
            let result = ledger.record(&meal(n), direction, None);
            prop_assert_eq!(result.is_ok(), seen.insert(n));
        }

        prop_assert_eq!(ledger.len(), seen.len());
        prop_assert_eq!(ledger.decided_ids().len(), ledger.len());
    }

    #[test]
    fn remaining_drops_by_one_per_accept(
        target in 1_usize..=21,
        directions in prop::collection::vec(direction(), 0..40)
    ) {
        let goal = GoalTracker::new(target).unwrap();
        let mut ledger = SwipeLedger::new();

        for (n, direction) in (0_u8..).zip(directions) {
            let before = goal.remaining(&ledger);
            ledger.record(&meal(n), direction, None).unwrap();
            let after = goal.remaining(&ledger);

            if direction == Direction::Accept && before > 0 {
                prop_assert_eq!(after, before - 1);
            } else {
                prop_assert_eq!(after, before);
            }
            prop_assert_eq!(goal.is_satisfied(&ledger), after == 0);
        }
    }

    #[test]
    fn retract_then_reaccept_restores_the_ledger(
        accepted in prop::collection::btree_set(0_u8..16, 1..8),
        strength in 1_u8..=5
    ) {
        let mut ledger = SwipeLedger::new();
        for n in &accepted {
            ledger.record(&meal(*n), Direction::Accept, Some(strength)).unwrap();
        }
        let count = ledger.accepted_count();
        let first = *accepted.iter().next().unwrap();
        let id = format!("m{first}");

        let removed = ledger.retract(&id).unwrap();
        prop_assert!(!ledger.is_decided(&id));
        prop_assert_eq!(ledger.accepted_count(), count - 1);

        ledger.record(&meal(first), Direction::Accept, Some(removed.strength.get())).unwrap();
        prop_assert!(ledger.is_accepted(&id));
        prop_assert_eq!(ledger.accepted_count(), count);
    }

    #[test]
    fn session_never_offers_a_decided_meal(
        target in 1_usize..=21,
        seed in any::<u64>(),
        directions in prop::collection::vec(direction(), 1..30)
    ) {
        let catalog = Catalog::fetch(&BundledCatalog).unwrap();
        let outbox = Outbox::spawn(NullSink).unwrap();
        let mut session = PlanSession::start(session_record(target, seed), catalog, outbox).unwrap();

        for direction in directions {
            let Some(candidate) = session.current_candidate().map(|m| m.id.clone()) else {
                break;
            };
            prop_assert!(!session.ledger().is_decided(&candidate));

            match session.decide(&candidate, direction, None).unwrap() {
                Outcome::Satisfied => {
                    prop_assert_eq!(session.ledger().accepted_count(), target);
                    prop_assert_eq!(session.state(), SessionState::Satisfied);
                    break;
                }
                Outcome::Continue { remaining } | Outcome::Exhausted { remaining } => {
                    prop_assert_eq!(remaining, target - session.ledger().accepted_count());
                }
            }
        }
        prop_assert_eq!(session.shutdown(), 0);
    }
}
