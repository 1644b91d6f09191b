//! Adapters implementing domain ports.
//!
//! File-backed repositories replace the whole file on every save by writing
//! a sibling temporary file and renaming it over the target.

pub mod in_memory_repository;
pub mod json_repository;
pub mod msgpack_repository;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

pub use in_memory_repository::InMemoryRepository;
pub use json_repository::{JsonQTableRepository, JsonStatsRepository};
pub use msgpack_repository::MsgPackQTableRepository;

use crate::{Error, Result};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `bytes` to `path` through a temporary file and a rename.
pub(crate) fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            operation: format!("create directory {}", parent.display()),
            source,
        })?;
    }

    let tmp = temp_path(path);
    let write = || -> io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };
    write().map_err(|source| {
        let _ = fs::remove_file(&tmp);
        Error::Io {
            operation: format!("write {}", path.display()),
            source,
        }
    })
}

/// Read `path`, mapping "not found" to `None`.
pub(crate) fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Io {
            operation: format!("read {}", path.display()),
            source,
        }),
    }
}
