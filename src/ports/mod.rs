//! Ports (trait boundaries) for external dependencies.
//!
//! The domain owns these traits; opponents, observers and storage backends
//! plug in behind them.

pub mod observer;
pub mod policy;
pub mod repository;

pub use observer::Observer;
pub use policy::Policy;
pub use repository::{QTableRepository, StatsRepository};
