//! Key-value ledger state for the loyalty ledger.
//!
//! The ledger core never talks to a storage engine directly. It reads and
//! writes opaque byte values under string keys through the
//! [`KeyValueState`] capability, and hands every invocation's writes over as
//! one [`WriteBatch`].
//!
//! # Storage Backends
//!
//! - [`InMemoryState`] -- `HashMap`-based state for tests and embedding
//! - [`FileState`] -- whole-state JSON file for the local CLI host
//!
//! # Design Rules
//!
//! 1. A batch is applied completely or not at all.
//! 2. Every key read during an invocation is recorded with the value observed;
//!    a batch whose reads went stale is rejected with [`StateError::Conflict`].
//! 3. The state never interprets values -- it is a pure key-value store.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod batch;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use batch::WriteBatch;
pub use error::{StateError, StateResult};
pub use file::FileState;
pub use memory::InMemoryState;
pub use traits::KeyValueState;
