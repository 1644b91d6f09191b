//! In-memory repository for testing.
//!
//! Implements both repository ports without touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    Error, Result,
    ports::{QTableRepository, StatsRepository},
    q_learning::QTableSnapshot,
    stats::StatsRecord,
};

const STATS_KEY: &str = "\0stats";

/// In-memory repository for testing.
///
/// Entries are stored as MessagePack bytes keyed by path, so loading goes
/// through the same decode step as a real file.
///
/// # Examples
///
/// ```
/// use qttt::adapters::InMemoryRepository;
/// use qttt::ports::QTableRepository;
/// use qttt::q_learning::QAgent;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let agent = QAgent::default();
///
/// repo.save(Path::new("q_table"), &agent.export())?;
/// let loaded = repo.load(Path::new("q_table"))?;
/// assert_eq!(loaded, Some(agent.export()));
/// # Ok::<(), qttt::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, the stats record included.
    pub fn count(&self) -> usize {
        self.storage.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.storage.lock().unwrap().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage
            .lock()
            .unwrap()
            .contains_key(&path.to_string_lossy().to_string())
    }

    /// Replace the bytes stored under `path`, e.g. to simulate corruption.
    pub fn put_raw(&self, path: &Path, bytes: Vec<u8>) {
        self.storage
            .lock()
            .unwrap()
            .insert(path.to_string_lossy().to_string(), bytes);
    }

    fn put<T: serde::Serialize>(&self, key: String, value: &T, what: &str) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(value).map_err(|e| Error::SerializationContext {
            operation: format!("serialize {what} for in-memory storage"),
            message: e.to_string(),
        })?;
        self.storage.lock().unwrap().insert(key, bytes);
        Ok(())
    }

    fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let storage = self.storage.lock().unwrap();
        let Some(bytes) = storage.get(key) else {
            return Ok(None);
        };
        rmp_serde::from_slice(bytes)
            .map(Some)
            .map_err(|e| Error::CorruptData {
                source_name: format!("in-memory entry {key:?}"),
                message: e.to_string(),
            })
    }
}

impl QTableRepository for InMemoryRepository {
    fn save(&self, path: &Path, snapshot: &QTableSnapshot) -> Result<()> {
        self.put(path.to_string_lossy().to_string(), snapshot, "Q-table")
    }

    fn load(&self, path: &Path) -> Result<Option<QTableSnapshot>> {
        self.get(&path.to_string_lossy())
    }
}

impl StatsRepository for InMemoryRepository {
    fn load_stats(&self) -> Result<StatsRecord> {
        Ok(self.get(STATS_KEY)?.unwrap_or_default())
    }

    fn save_stats(&self, record: &StatsRecord) -> Result<()> {
        self.put(STATS_KEY.to_string(), record, "stats record")
    }
}
