//! Repository ports for Q-table and statistics persistence.

use std::path::Path;

use crate::{Result, q_learning::QTableSnapshot, stats::StatsRecord};

/// Port for persisting and loading Q-table snapshots.
///
/// Implementations must tell "nothing stored" apart from "stored but
/// unreadable": the first is `Ok(None)`, the second an error. Saves replace
/// the whole snapshot.
///
/// # Examples
///
/// ```no_run
/// use qttt::{ports::QTableRepository, q_learning::QAgent};
/// use std::path::Path;
///
/// fn resume<R: QTableRepository>(repo: &R, agent: &mut QAgent, path: &Path) -> qttt::Result<bool> {
///     match repo.load(path)? {
///         Some(snapshot) => {
///             agent.load(&snapshot)?;
///             Ok(true)
///         }
///         None => Ok(false),
///     }
/// }
/// ```
pub trait QTableRepository {
    /// Save a snapshot, replacing anything previously stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn save(&self, path: &Path, snapshot: &QTableSnapshot) -> Result<()>;

    /// Load the snapshot stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if data exists but cannot be read or decoded.
    fn load(&self, path: &Path) -> Result<Option<QTableSnapshot>>;
}

/// Port for the process-wide statistics record.
///
/// The record is loaded at start-up and saved at run boundaries; the core
/// never touches it directly.
pub trait StatsRepository {
    /// Load the record, or a fresh default one if none has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored record exists but is corrupt.
    fn load_stats(&self) -> Result<StatsRecord>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn save_stats(&self, record: &StatsRecord) -> Result<()>;
}
