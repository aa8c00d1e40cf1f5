//! hearth-core - Core library for Hearth
//!
//! This crate provides the shared logic between the hearth CLI and hearth-server:
//!
//! - **pile**: the pile tree model and value mutations
//! - **reconcile**: folds the declarative pile configuration into live state
//! - **workflow**: threshold triggers and per-pile workflow state machines
//! - **history**: task event transitions and the leaderboard aggregator
//! - **bus**: in-process typed publish/subscribe
//! - **store**: the single lock-guarded owner of the live system state
//! - **clients**: thin HTTP clients for the inventory and task subsystems
//! - **orchestration**: cross-subsystem coordination with partial-failure tolerance
//! - **persist**: state snapshot load/save
//! - **config**: declarative pile/workflow configuration loading
//! - **notify**: notification seam

pub mod bus;
pub mod clients;
pub mod config;
pub mod error;
pub mod history;
pub mod notify;
pub mod orchestration;
pub mod persist;
pub mod pile;
pub mod reconcile;
pub mod store;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use error::{Error, Result};
pub use store::StateStore;
pub use types::{Pile, PileConfig, SystemState, TaskEvent, TaskStatus};
