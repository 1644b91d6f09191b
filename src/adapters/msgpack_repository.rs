//! MessagePack implementation of the Q-table repository.
//!
//! Uses rmp_serde for a compact binary form of the same nested map the JSON
//! repository writes.

use std::path::Path;

use super::{read_if_exists, replace_file};
use crate::{Error, Result, ports::QTableRepository, q_learning::QTableSnapshot};

/// MessagePack-based Q-table repository.
///
/// # Examples
///
/// ```no_run
/// use qttt::adapters::MsgPackQTableRepository;
/// use qttt::ports::QTableRepository;
/// use qttt::q_learning::QAgent;
/// use std::path::Path;
///
/// let repo = MsgPackQTableRepository;
/// repo.save(Path::new("q_table.msgpack"), &QAgent::default().export())?;
/// let loaded = repo.load(Path::new("q_table.msgpack"))?;
/// # Ok::<(), qttt::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackQTableRepository;

impl MsgPackQTableRepository {
    pub fn new() -> Self {
        Self
    }
}

impl QTableRepository for MsgPackQTableRepository {
    fn save(&self, path: &Path, snapshot: &QTableSnapshot) -> Result<()> {
        let bytes = rmp_serde::to_vec(snapshot).map_err(|e| Error::SerializationContext {
            operation: "serialize Q-table to MessagePack".to_string(),
            message: e.to_string(),
        })?;
        replace_file(path, &bytes)
    }

    fn load(&self, path: &Path) -> Result<Option<QTableSnapshot>> {
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

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("q_table.msgpack");

        let mut snapshot = QTableSnapshot::new();
        snapshot.insert("0,0,0,0,1,0,0,0,-1", 2, 0.7);
        snapshot.insert("0,0,0,0,0,0,0,0,0", 4, f64::MIN_POSITIVE);

        let repo = MsgPackQTableRepository::new();
        repo.save(&file_path, &snapshot).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded, Some(snapshot));
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let repo = MsgPackQTableRepository::new();
        assert!(
            repo.load(&temp_dir.path().join("missing.msgpack"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.msgpack");
        std::fs::write(&path, [0xc1, 0x00, 0x13]).unwrap();

        let result = MsgPackQTableRepository::new().load(&path);
        assert!(matches!(result, Err(Error::CorruptData { .. })));
    }
}
