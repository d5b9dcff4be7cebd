//! Property-based tests for balance invariants.
//!
//! - Balance conservation: stored balance == Σearn − Σuse
//! - Non-negativity: no sequence of operations drives a balance below zero
//! - Rejected operations leave state untouched

use chrono::{TimeZone, Utc};
use loyalty_ledger::{ErrorKind, FixedContext, LedgerContract};
use loyalty_state::InMemoryState;
use loyalty_types::{Member, PointsRequest};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Earn(i64),
    Use(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..500).prop_map(Op::Earn),
        (1i64..500).prop_map(Op::Use),
    ]
}

fn new_member() -> Member {
    Member {
        first_name: "Prop".into(),
        last_name: "Tester".into(),
        email: "prop@example.com".into(),
        phone_number: "5550000".into(),
        account_number: "A1".into(),
        card_id: "c".into(),
        points: 0,
    }
}

proptest! {
    #[test]
    fn balance_matches_journals(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let ledger = LedgerContract::new(InMemoryState::new());
        ledger.create_member(&new_member()).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut model = 0i64;
        for (i, op) in ops.iter().enumerate() {
            let ctx = FixedContext::new(format!("tx-{i}"), ts);
            match *op {
                Op::Earn(points) => {
                    ledger.earn_points(&ctx, &PointsRequest::new("A1", "P1", points)).unwrap();
                    model += points;
                }
                Op::Use(points) => {
                    let before = ledger.state().snapshot().unwrap();
                    match ledger.use_points(&ctx, &PointsRequest::new("A1", "P1", points)) {
                        Ok(_) => model -= points,
                        Err(e) => {
                            prop_assert_eq!(e.kind(), ErrorKind::InsufficientBalance);
                            prop_assert!(points > model);
                            prop_assert_eq!(ledger.state().snapshot().unwrap(), before);
                        }
                    }
                }
            }
            let balance = ledger.get_member("A1").unwrap().points;
            prop_assert!(balance >= 0);
            prop_assert_eq!(balance, model);
        }

        let audit = ledger.audit_member("A1").unwrap();
        prop_assert!(audit.is_consistent());
        prop_assert_eq!(audit.expected(), i128::from(model));
    }
}
