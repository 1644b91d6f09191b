//! Serialization support for Q-learning agents.
//!
//! Two formats are provided:
//! - [`QTableSnapshot`]: the bare table as a nested map
//!   `state key -> action -> value`, suitable for JSON interchange.
//! - [`SavedQAgent`]: a versioned MessagePack envelope that also keeps the
//!   hyperparameters and schedule position so training can resume.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use super::{QAgent, QAgentConfig, QTable};
use crate::{
    Error, Result,
    adapters::{read_if_exists, replace_file},
    tictactoe::BOARD_CELLS,
    types::CanonicalState,
};

/// Opaque export of a Q-table.
///
/// Keys are canonical state keys (`"1,0,-1,..."`); ordering is by key, so
/// two equal tables always serialise to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QTableSnapshot {
    entries: BTreeMap<String, BTreeMap<usize, f64>>,
}

impl QTableSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_table(table: &QTable) -> Self {
        let entries = table
            .iter()
            .map(|(state, actions)| (state.key(), actions.clone()))
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, key: impl Into<String>, action: usize, value: f64) {
        self.entries.entry(key.into()).or_default().insert(action, value);
    }

    pub fn get(&self, key: &str, action: usize) -> Option<f64> {
        self.entries.get(key).and_then(|actions| actions.get(&action)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<usize, f64>)> {
        self.entries.iter()
    }

    /// Number of states in the snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (state, action) values in the snapshot
    pub fn value_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Check every key, action and value, then copy them into `table`.
    pub(crate) fn fill_table(&self, table: &mut QTable) -> Result<()> {
        let corrupt = |message: String| Error::CorruptData {
            source_name: "Q-table snapshot".to_string(),
            message,
        };

        for (key, actions) in &self.entries {
            let state = CanonicalState::parse(key).map_err(|e| corrupt(e.to_string()))?;
            for (&action, &value) in actions {
                if action >= BOARD_CELLS {
                    return Err(corrupt(format!("state '{key}' has action {action} out of range")));
                }
                if !value.is_finite() {
                    return Err(corrupt(format!(
                        "state '{key}' action {action} has non-finite value {value}"
                    )));
                }
                table.set(state, action, value);
            }
        }
        Ok(())
    }
}

/// Versioned on-disk form of a [`QAgent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQAgent {
    pub version: u32,
    pub config: QAgentConfig,
    /// Completed episodes; fixes the position in the epsilon schedule.
    pub episodes_trained: u64,
    pub snapshot: QTableSnapshot,
}

impl SavedQAgent {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &QAgent) -> Self {
        Self {
            version: Self::VERSION,
            config: *agent.config(),
            episodes_trained: agent.episodes_decayed(),
            snapshot: agent.export(),
        }
    }

    /// Rebuild the agent, continuing its exploration schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for unknown versions and
    /// [`Error::CorruptData`] for an invalid snapshot or configuration.
    pub fn to_agent(&self) -> Result<QAgent> {
        self.config.validate().map_err(|e| Error::CorruptData {
            source_name: "saved agent".to_string(),
            message: e.to_string(),
        })?;
        self.resume_with(self.config)
    }

    /// Rebuild the agent with new hyperparameters, keeping its table and
    /// its position in the exploration schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for unknown versions and
    /// [`Error::CorruptData`] for an invalid snapshot.
    pub fn resume_with(&self, config: QAgentConfig) -> Result<QAgent> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        let mut agent = QAgent::resumed(config, self.episodes_trained);
        agent.load(&self.snapshot)?;
        Ok(agent)
    }

    /// Write the agent as named MessagePack, replacing any previous file
    /// only once the new one is fully written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(self).map_err(|e| Error::SerializationContext {
            operation: "serialize Q-agent".to_string(),
            message: e.to_string(),
        })?;
        replace_file(path.as_ref(), &bytes)
    }

    /// Read a saved agent; `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptData`] if the file cannot be decoded.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        let Some(bytes) = read_if_exists(path)? else {
            return Ok(None);
        };
        rmp_serde::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::CorruptData {
                source_name: path.display().to_string(),
                message: e.to_string(),
            })
    }
}
