//! Foundation types for the loyalty ledger.
//!
//! This crate provides the records exchanged with callers and persisted in
//! ledger state. Every other loyalty crate depends on `loyalty-types`.
//!
//! # Key Types
//!
//! - [`Member`] -- Point-holding account keyed by account number
//! - [`Partner`] -- Merchant partner keyed by partner id
//! - [`PointTransaction`] -- Immutable journal entry for an earn or a spend
//! - [`PointsRequest`] -- Caller input for earn/use operations
//! - [`JournalKind`] -- Which journal (earn or spend) an entry lives in
//! - [`Role`] -- Filter axis for journal lookups (member or partner)
//!
//! Field names follow the camelCase wire contract (`accountNumber`,
//! `partnerId`, `transactionId`, `timestamps`, ...).

pub mod account;
pub mod error;
pub mod transaction;
pub mod validation;

pub use account::{Member, Partner};
pub use error::TypeError;
pub use transaction::{JournalKind, PointTransaction, PointsRequest, Role};
pub use validation::{validate_member, validate_partner, validate_request};
