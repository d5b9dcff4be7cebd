use serde::{Deserialize, Serialize};

/// Tunables for [`LedgerContract`](crate::LedgerContract).
///
/// Every replica evaluating the same invocation must run with the same
/// configuration, or results will diverge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Reject mutating operations until `init` has written its marker.
    pub require_init: bool,
    /// Upper bound on the points moved by a single earn or use.
    pub max_points_per_transaction: i64,
    /// Check every profile field on create. When `false` only the record
    /// key (and the opening balance) are checked.
    pub validate_profiles: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            require_init: false,
            max_points_per_transaction: i64::MAX,
            validate_profiles: true,
        }
    }
}

impl LedgerConfig {
    /// A configuration that refuses to operate on an uninitialized ledger.
    pub fn strict() -> Self {
        Self {
            require_init: true,
            ..Default::default()
        }
    }
}
