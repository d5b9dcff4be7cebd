use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Which journal a transaction is appended to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalKind {
    /// Points credited to a member.
    Earn,
    /// Points debited from a member.
    Spend,
}

impl JournalKind {
    pub const ALL: [JournalKind; 2] = [JournalKind::Earn, JournalKind::Spend];
}

impl fmt::Display for JournalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Earn => write!(f, "earn"),
            Self::Spend => write!(f, "spend"),
        }
    }
}

/// Filter axis for journal lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Partner,
}

impl Role {
    /// Returns `true` if `tx` belongs to `id` under this role.
    pub fn matches(&self, tx: &PointTransaction, id: &str) -> bool {
        match self {
            Self::Member => tx.member == id,
            Self::Partner => tx.partner == id,
        }
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "partner" => Ok(Self::Partner),
            other => Err(TypeError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member => write!(f, "member"),
            Self::Partner => write!(f, "partner"),
        }
    }
}

/// Caller input for an earn or use operation.
///
/// Any transaction id or timestamp the caller sends is ignored; those come
/// from the invocation context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsRequest {
    #[serde(default)]
    pub member: String,
    #[serde(default)]
    pub partner: String,
    #[serde(default)]
    pub points: i64,
}

impl PointsRequest {
    pub fn new(member: impl Into<String>, partner: impl Into<String>, points: i64) -> Self {
        Self {
            member: member.into(),
            partner: partner.into(),
            points,
        }
    }
}

/// An immutable journal entry.
///
/// `transaction_id` and `timestamp` are assigned from the invocation context
/// when the entry is created and never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointTransaction {
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub member: String,
    pub partner: String,
    pub points: i64,
    #[serde(rename = "timestamps")]
    pub timestamp: DateTime<Utc>,
}

impl PointTransaction {
    /// Build a journal entry from a validated request.
    pub fn from_request(
        request: &PointsRequest,
        transaction_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            member: request.member.clone(),
            partner: request.partner.clone(),
            points: request.points,
            timestamp,
        }
    }
}
