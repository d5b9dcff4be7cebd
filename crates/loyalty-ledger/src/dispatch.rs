//! Name-based entry point for hosts that deliver invocations as a function
//! name plus string arguments.
//!
//! | Function                     | Arguments               | Returns                  |
//! |------------------------------|-------------------------|--------------------------|
//! | `InitLedger`                 | none                    | `"Initialized"` or `"AlreadyInitialized"` |
//! | `CreateMember`               | member JSON             | stored member JSON       |
//! | `CreatePartner`              | partner JSON            | stored partner JSON      |
//! | `EarnPoints`                 | points request JSON     | recorded transaction JSON |
//! | `UsePoints`                  | points request JSON     | recorded transaction JSON |
//! | `EarnPointsTransactionsInfo` | role, id                | JSON array of transactions |
//! | `UsePointsTransactionsInfo`  | role, id                | JSON array of transactions |
//! | `GetState`                   | key                     | raw value as text        |

use loyalty_state::{KeyValueState, StateError};
use loyalty_types::{Member, Partner, PointTransaction, PointsRequest, Role};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::context::InvocationContext;
use crate::contract::LedgerContract;
use crate::error::{LedgerError, LedgerResult};

/// Every function name [`invoke`] accepts.
pub const FUNCTIONS: [&str; 8] = [
    "InitLedger",
    "CreateMember",
    "CreatePartner",
    "EarnPoints",
    "UsePoints",
    "EarnPointsTransactionsInfo",
    "UsePointsTransactionsInfo",
    "GetState",
];

/// Route `function` to the matching contract operation.
pub fn invoke<S, C>(
    contract: &LedgerContract<S>,
    ctx: &C,
    function: &str,
    args: &[String],
) -> LedgerResult<String>
where
    S: KeyValueState,
    C: InvocationContext + ?Sized,
{
    debug!(function, args = args.len(), "dispatching");
    match function {
        "InitLedger" => {
            expect_arity(function, args, 0)?;
            encode(&contract.init()?)
        }
        "CreateMember" => {
            expect_arity(function, args, 1)?;
            let profile: Member = decode(function, &args[0])?;
            encode(&contract.create_member(&profile)?)
        }
        "CreatePartner" => {
            expect_arity(function, args, 1)?;
            let profile: Partner = decode(function, &args[0])?;
            encode(&contract.create_partner(&profile)?)
        }
        "EarnPoints" => {
            expect_arity(function, args, 1)?;
            let request: PointsRequest = decode(function, &args[0])?;
            encode(&contract.earn_points(ctx, &request)?)
        }
        "UsePoints" => {
            expect_arity(function, args, 1)?;
            let request: PointsRequest = decode(function, &args[0])?;
            encode(&contract.use_points(ctx, &request)?)
        }
        "EarnPointsTransactionsInfo" => {
            expect_arity(function, args, 2)?;
            let role: Role = args[0].parse()?;
            let found: Vec<PointTransaction> =
                contract.earn_transactions_for(role, &args[1])?.collect();
            encode(&found)
        }
        "UsePointsTransactionsInfo" => {
            expect_arity(function, args, 2)?;
            let role: Role = args[0].parse()?;
            let found: Vec<PointTransaction> =
                contract.use_transactions_for(role, &args[1])?.collect();
            encode(&found)
        }
        "GetState" => {
            expect_arity(function, args, 1)?;
            let raw = contract.read_raw(&args[0])?;
            Ok(String::from_utf8_lossy(&raw).into_owned())
        }
        other => Err(LedgerError::InvalidInput(format!(
            "unknown function {other}"
        ))),
    }
}

fn expect_arity(function: &str, args: &[String], expected: usize) -> LedgerResult<()> {
    if args.len() != expected {
        return Err(LedgerError::InvalidInput(format!(
            "{function} takes {expected} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(function: &str, raw: &str) -> LedgerResult<T> {
    serde_json::from_str(raw)
        .map_err(|e| LedgerError::InvalidInput(format!("{function} payload: {e}")))
}

fn encode<T: Serialize + ?Sized>(value: &T) -> LedgerResult<String> {
    serde_json::to_string(value).map_err(|e| {
        LedgerError::StateWriteFailure(StateError::Serialization(format!("encode result: {e}")))
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use loyalty_state::InMemoryState;

    use super::*;
    use crate::context::FixedContext;
    use crate::error::ErrorKind;

    fn ctx(id: &str) -> FixedContext {
        FixedContext::new(id, Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 0).unwrap())
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    const MEMBER: &str = r#"{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","phoneNumber":"555-0101","accountNumber":"A1","cardId":"c1"}"#;
    const PARTNER: &str = r#"{"name":"Bookshop","partnerId":"P1","cardId":"pc1"}"#;

    #[test]
    fn full_flow_through_names() {
        let ledger = LedgerContract::new(InMemoryState::new());
        let out = invoke(&ledger, &ctx("t0"), "InitLedger", &[]).unwrap();
        assert_eq!(out, r#""Initialized""#);

        invoke(&ledger, &ctx("t1"), "CreateMember", &args(&[MEMBER])).unwrap();
        invoke(&ledger, &ctx("t2"), "CreatePartner", &args(&[PARTNER])).unwrap();

        // A client-supplied transaction id is ignored in favour of the context.
        let earn = r#"{"member":"A1","partner":"P1","points":25,"transactionId":"client"}"#;
        let recorded = invoke(&ledger, &ctx("t3"), "EarnPoints", &args(&[earn])).unwrap();
        let tx: PointTransaction = serde_json::from_str(&recorded).unwrap();
        assert_eq!(tx.transaction_id, "t3");

        let history = invoke(
            &ledger,
            &ctx("t4"),
            "EarnPointsTransactionsInfo",
            &args(&["partner", "P1"]),
        )
        .unwrap();
        let history: Vec<PointTransaction> = serde_json::from_str(&history).unwrap();
        assert_eq!(history, vec![tx]);

        let raw = invoke(&ledger, &ctx("t5"), "GetState", &args(&["A1"])).unwrap();
        let member: Member = serde_json::from_str(&raw).unwrap();
        assert_eq!(member.points, 25);
    }

    #[test]
    fn get_state_of_absent_key_is_empty() {
        let ledger = LedgerContract::new(InMemoryState::new());
        let out = invoke(&ledger, &ctx("t1"), "GetState", &args(&["missing"])).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_bad_invocations() {
        let ledger = LedgerContract::new(InMemoryState::new());
        let cases: [(&str, Vec<String>); 4] = [
            ("Transfer", vec![]),
            ("CreateMember", vec![]),
            ("CreateMember", args(&["{not json"])),
            ("UsePointsTransactionsInfo", args(&["admin", "A1"])),
        ];
        for (function, a) in cases {
            let err = invoke(&ledger, &ctx("t1"), function, &a).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{function}");
        }
        assert!(ledger.state().is_empty());
    }

    #[test]
    fn every_listed_function_is_routed() {
        let ledger = LedgerContract::new(InMemoryState::new());
        for function in FUNCTIONS {
            // Wrong arity everywhere, but never "unknown function".
            let err = invoke(&ledger, &ctx("t1"), function, &args(&["x", "y", "z"])).unwrap_err();
            assert!(!err.to_string().contains("unknown function"), "{function}");
        }
    }
}
