use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::batch::WriteBatch;
use crate::error::{StateError, StateResult};
use crate::traits::KeyValueState;

const FORMAT_VERSION: u32 = 1;

/// On-disk layout. Values are hex-encoded so arbitrary bytes survive JSON.
#[derive(Serialize, Deserialize)]
struct StateFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

/// Ledger state persisted as a single JSON file.
///
/// The whole file is loaded on [`open`](Self::open) and rewritten on every
/// successful `put`/`apply`. Rewrites go to a temporary file in the same
/// directory which is then renamed over the original, so a crash leaves
/// either the old or the new state on disk, never a torn file.
pub struct FileState {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl FileState {
    /// Open the state file at `path`, starting empty if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> StateResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read(&path) {
            Ok(raw) => decode(&path, &raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "state file absent, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if no key is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> StateResult<Vec<String>> {
        let map = self.entries.read().map_err(|_| StateError::LockPoisoned)?;
        Ok(map.keys().cloned().collect())
    }

    fn persist(&self, entries: &BTreeMap<String, Vec<u8>>) -> StateResult<()> {
        let file = StateFile {
            version: FORMAT_VERSION,
            entries: entries
                .iter()
                .map(|(k, v)| (k.clone(), hex::encode(v)))
                .collect(),
        };
        let encoded = serde_json::to_vec_pretty(&file)
            .map_err(|e| StateError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StateError::Io(e.error))?;
        Ok(())
    }
}

fn decode(path: &Path, raw: &[u8]) -> StateResult<BTreeMap<String, Vec<u8>>> {
    let corrupt = |reason: String| StateError::Corrupt {
        path: path.display().to_string(),
        reason,
    };
    let file: StateFile = serde_json::from_slice(raw).map_err(|e| corrupt(e.to_string()))?;
    if file.version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported version {}", file.version)));
    }
    file.entries
        .into_iter()
        .map(|(k, v)| {
            let bytes = hex::decode(&v).map_err(|e| corrupt(format!("key {k}: {e}")))?;
            Ok((k, bytes))
        })
        .collect()
}

impl KeyValueState for FileState {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(|_| StateError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StateResult<()> {
        if key.is_empty() {
            return Err(StateError::InvalidKey(key.to_string()));
        }
        let mut map = self.entries.write().map_err(|_| StateError::LockPoisoned)?;
        let mut next = map.clone();
        next.insert(key.to_string(), value.to_vec());
        self.persist(&next)?;
        *map = next;
        Ok(())
    }

    fn apply(&self, batch: &WriteBatch) -> StateResult<()> {
        if let Some((key, _)) = batch.writes().find(|(key, _)| key.is_empty()) {
            return Err(StateError::InvalidKey(key.clone()));
        }

        let mut map = self.entries.write().map_err(|_| StateError::LockPoisoned)?;
        if let Some(key) = batch.first_conflict(|k| map.get(k).map(Vec::as_slice)) {
            warn!(key = %key, "rejecting batch with stale read");
            return Err(StateError::Conflict { key });
        }
        if batch.is_empty() {
            return Ok(());
        }

        let mut next = map.clone();
        for (key, value) in batch.writes() {
            next.insert(key.clone(), value.clone());
        }
        self.persist(&next)?;
        *map = next;
        debug!(writes = batch.len(), path = %self.path.display(), "persisted batch");
        Ok(())
    }
}

impl std::fmt::Debug for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileState")
            .field("path", &self.path)
            .field("key_count", &self.len())
            .finish()
    }
}
