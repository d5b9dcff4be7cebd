use serde::{Deserialize, Serialize};

/// Balance reconciliation for one member.
///
/// `expected` is recomputed from the journals (Σearn − Σspend) and compared
/// with the balance stored on the member record. The sums are kept as
/// `i128`: lifetime totals may exceed `i64` while every balance stays in range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAudit {
    pub account: String,
    /// `None` if the journals reference a member with no record.
    pub stored_balance: Option<i64>,
    pub earned: i128,
    pub spent: i128,
    pub earn_entries: usize,
    pub spend_entries: usize,
}

impl BalanceAudit {
    /// Σearn − Σspend.
    pub fn expected(&self) -> i128 {
        self.earned - self.spent
    }

    /// Returns `true` if the stored balance matches the journals.
    pub fn is_consistent(&self) -> bool {
        self.stored_balance.map(i128::from) == Some(self.expected())
    }
}
