//! JSON file repositories.
//!
//! The Q-table is stored as a nested object `{ state_key: { action: value } }`
//! and the stats record as one pretty-printed document.

use std::path::{Path, PathBuf};

use super::{read_if_exists, replace_file};
use crate::{
    Error, Result,
    ports::{QTableRepository, StatsRepository},
    q_learning::QTableSnapshot,
    stats::StatsRecord,
};

fn corrupt(path: &Path, e: serde_json::Error) -> Error {
    Error::CorruptData {
        source_name: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Q-table snapshots as plain JSON files.
///
/// # Examples
///
/// ```no_run
/// use qttt::adapters::JsonQTableRepository;
/// use qttt::ports::QTableRepository;
/// use qttt::q_learning::QAgent;
/// use std::path::Path;
///
/// let repo = JsonQTableRepository::new();
/// let agent = QAgent::default();
/// repo.save(Path::new("q_table.json"), &agent.export())?;
/// let loaded = repo.load(Path::new("q_table.json"))?;
/// assert!(loaded.is_some());
/// # Ok::<(), qttt::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonQTableRepository;

impl JsonQTableRepository {
    pub fn new() -> Self {
        Self
    }
}

impl QTableRepository for JsonQTableRepository {
    fn save(&self, path: &Path, snapshot: &QTableSnapshot) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;
        replace_file(path, &bytes)
    }

    fn load(&self, path: &Path) -> Result<Option<QTableSnapshot>> {
        let Some(bytes) = read_if_exists(path)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| corrupt(path, e))
    }
}

/// The stats record as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonStatsRepository {
    path: PathBuf,
}

impl JsonStatsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsRepository for JsonStatsRepository {
    fn load_stats(&self) -> Result<StatsRecord> {
        let Some(bytes) = read_if_exists(&self.path)? else {
            return Ok(StatsRecord::default());
        };
        serde_json::from_slice(&bytes).map_err(|e| corrupt(&self.path, e))
    }

    fn save_stats(&self, record: &StatsRecord) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(record)?;
        replace_file(&self.path, &bytes)
    }
}
