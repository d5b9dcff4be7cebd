//! Deterministic loyalty-point ledger.
//!
//! This crate is the contract itself. It provides:
//! - Member and partner account records keyed by identifier
//! - A partner registry in creation order
//! - Append-only earn and spend journals with lazy role/id filters
//! - `LedgerContract`, which runs every operation as one atomic write set
//! - Balance audits reconciling stored balances against the journals
//! - Name-based dispatch for hosts that speak function names and strings
//!
//! # Design Rules
//!
//! 1. No clocks, counters, or randomness: transaction id and timestamp come
//!    from the [`InvocationContext`].
//! 2. Every operation either applies its whole write set or nothing.
//! 3. Balances never go negative; a balance only changes together with the
//!    journal entry that explains it.
//! 4. Callers match on [`ErrorKind`], never on message text.

pub mod accounts;
pub mod audit;
pub mod config;
pub mod context;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod journal;
pub mod keys;
pub mod registry;
pub mod view;

pub use accounts::AccountStore;
pub use audit::BalanceAudit;
pub use config::LedgerConfig;
pub use context::{FixedContext, InvocationContext};
pub use contract::{InitOutcome, LedgerContract};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use journal::{JournalFilter, TransactionJournal};
pub use registry::PartnerRegistry;
pub use view::StateView;
