//! Tabular Q-learning
//!
//! The agent learns `Q(s, a)` over canonical states with the off-policy TD
//! rule
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//! ```
//!
//! and explores epsilon-greedily, with epsilon following a pure
//! [`EpsilonSchedule`] of the completed episode count.
//!
//! ## Usage Example
//!
//! ```no_run
//! use qttt::q_learning::{QAgent, QAgentConfig};
//!
//! let agent = QAgent::new(QAgentConfig {
//!     alpha: 0.2,
//!     gamma: 0.95,
//!     ..QAgentConfig::default()
//! });
//! let snapshot = agent.export();
//! ```

pub mod agent;
pub mod q_table;
pub mod schedule;
pub mod serialization;

pub use agent::{QAgent, QAgentConfig};
pub use q_table::QTable;
pub use schedule::EpsilonSchedule;
pub use serialization::{QTableSnapshot, SavedQAgent};
