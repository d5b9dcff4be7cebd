use std::collections::BTreeMap;

/// The read and write sets of one invocation.
///
/// Reads record the value first observed in the backing state for each key
/// (`None` for absent keys). Writes are kept in key order, so two replicas
/// that staged the same writes produce byte-identical batches regardless of
/// staging order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    reads: BTreeMap<String, Option<Vec<u8>>>,
    writes: BTreeMap<String, Vec<u8>>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value observed for `key` in the backing state.
    ///
    /// Only the first observation is kept; later reads of the same key are
    /// served from the same snapshot by the caller.
    pub fn record_read(&mut self, key: &str, observed: Option<Vec<u8>>) {
        self.reads.entry(key.to_string()).or_insert(observed);
    }

    /// Stage a write. A later write to the same key replaces the earlier one.
    pub fn stage(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.writes.insert(key.into(), value);
    }

    /// The staged value for `key`, if any.
    pub fn staged(&self, key: &str) -> Option<&[u8]> {
        self.writes.get(key).map(Vec::as_slice)
    }

    /// The value recorded when `key` was first read, if it was read at all.
    pub fn observed(&self, key: &str) -> Option<Option<&[u8]>> {
        self.reads.get(key).map(Option::as_deref)
    }

    pub fn reads(&self) -> impl Iterator<Item = (&String, &Option<Vec<u8>>)> {
        self.reads.iter()
    }

    pub fn writes(&self) -> impl Iterator<Item = (&String, &Vec<u8>)> {
        self.writes.iter()
    }

    /// First key in the read set whose current value differs from the value
    /// observed, given a lookup into the current state.
    pub fn first_conflict<'s>(
        &self,
        current: impl Fn(&str) -> Option<&'s [u8]>,
    ) -> Option<String> {
        self.reads
            .iter()
            .find(|(key, observed)| current(key) != observed.as_deref())
            .map(|(key, _)| key.clone())
    }

    /// Number of staged writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns `true` if nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// BLAKE3 digest of the write set, for comparing replicas.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"loyalty-writeset-v1:");
        for (key, value) in &self.writes {
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value);
        }
        *hasher.finalize().as_bytes()
    }

    /// Hex-encoded [`digest`](Self::digest).
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}
