//! CLI subcommands

pub mod evaluate;
pub mod play;
pub mod stats;
pub mod train;
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::{
    adapters::JsonQTableRepository,
    ports::QTableRepository,
    q_learning::{QAgent, QAgentConfig, SavedQAgent},
};

/// Agent files ending in `.json` hold a bare Q-table; anything else is a
/// MessagePack [`SavedQAgent`].
pub(crate) fn is_json_table(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load an agent file, using `config` for the hyperparameters.
///
/// Returns `None` when the file does not exist.
pub(crate) fn load_agent(path: &Path, config: QAgentConfig) -> Result<Option<QAgent>> {
    if is_json_table(path) {
        let Some(snapshot) = JsonQTableRepository::new().load(path)? else {
            return Ok(None);
        };
        let mut agent = QAgent::new(config);
        agent
            .load(&snapshot)
            .with_context(|| format!("Invalid Q-table in {}", path.display()))?;
        return Ok(Some(agent));
    }

    let Some(saved) = SavedQAgent::load_from_file(path)? else {
        return Ok(None);
    };
    let agent = saved
        .resume_with(config)
        .with_context(|| format!("Invalid saved agent in {}", path.display()))?;
    Ok(Some(agent))
}

/// Load an agent with the hyperparameters it was saved with.
pub(crate) fn load_trained_agent(path: &Path) -> Result<QAgent> {
    if is_json_table(path) {
        return load_agent(path, QAgentConfig::default())?
            .with_context(|| format!("No Q-table at {}", path.display()));
    }
    let saved = SavedQAgent::load_from_file(path)?
        .with_context(|| format!("No saved agent at {}", path.display()))?;
    saved
        .to_agent()
        .with_context(|| format!("Invalid saved agent in {}", path.display()))
}

/// Load an agent to continue training, or start empty if the file is absent.
pub(crate) fn load_or_fresh(path: &Path, config: QAgentConfig) -> Result<QAgent> {
    match load_agent(path, config)? {
        Some(agent) => Ok(agent),
        None => {
            warn!(path = %path.display(), "no saved agent found, starting from an empty table");
            Ok(QAgent::new(config))
        }
    }
}

/// Save an agent in the format its extension selects.
pub(crate) fn save_agent(agent: &QAgent, path: &Path) -> Result<()> {
    if is_json_table(path) {
        JsonQTableRepository::new()
            .save(path, &agent.export())
            .with_context(|| format!("Failed to write Q-table to {}", path.display()))
    } else {
        SavedQAgent::from_agent(agent)
            .save_to_file(path)
            .with_context(|| format!("Failed to write agent to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_extension_selects_format() {
        assert!(is_json_table(Path::new("q.json")));
        assert!(is_json_table(Path::new("dir/Q.JSON")));
        assert!(!is_json_table(Path::new("agent.msgpack")));
        assert!(!is_json_table(Path::new("agent")));
    }

    #[test]
    fn test_missing_file_starts_fresh() {
        let dir = tempdir().unwrap();
        for name in ["absent.json", "absent.msgpack"] {
            let agent = load_or_fresh(&dir.path().join(name), QAgentConfig::default()).unwrap();
            assert_eq!(agent.state_count(), 0);
        }
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        assert!(load_or_fresh(&path, QAgentConfig::default()).is_err());
    }
}
