//! Sentinel keys holding aggregate structures rather than single entities.

/// Marker written by `init`.
pub const INIT_KEY: &str = "instantiate";

/// Value stored under [`INIT_KEY`].
pub const INIT_MARKER: &[u8] = b"INIT-LEDGER";

/// JSON array of every partner, in creation order.
pub const ALL_PARTNERS_KEY: &str = "all-partners";

/// JSON array of earn transactions, in commit order.
pub const EARN_JOURNAL_KEY: &str = "earn-points-transactions";

/// JSON array of spend transactions, in commit order.
pub const SPEND_JOURNAL_KEY: &str = "use-points-transactions";

/// Every reserved key. Entity keys may not collide with these.
pub const RESERVED_KEYS: [&str; 4] = [
    INIT_KEY,
    ALL_PARTNERS_KEY,
    EARN_JOURNAL_KEY,
    SPEND_JOURNAL_KEY,
];

/// Returns `true` if `key` is one of the sentinel keys.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}
