//! Shared entity types for hearth-core.
//!
//! These types are used by the store, the reconciler, the trigger engine and
//! the server/CLI API layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Declarative configuration
// ─────────────────────────────────────────────────────────────────────────────

/// One node of the declarative pile forest.
///
/// Ids are unique among siblings, not globally; the path from the root to a
/// node identifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub initial_value: i64,
    pub max_value: i64,
    #[serde(default)]
    pub subpiles: Vec<PileConfig>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Live state
// ─────────────────────────────────────────────────────────────────────────────

/// A live pile: a bounded accumulator of outstanding need for one category of
/// recurring work. Mirrors the shape of its originating `PileConfig` subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pile {
    pub id: String,
    pub display_name: String,
    pub value: i64,
    pub max_value: i64,
    #[serde(default)]
    pub subpiles: Vec<Pile>,
}

/// The whole live system: the pile forest plus the append-only task history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    #[serde(default)]
    pub piles: Vec<Pile>,
    #[serde(default)]
    pub task_history: Vec<TaskEvent>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Task history
// ─────────────────────────────────────────────────────────────────────────────

/// Status machine for a task history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Assigned,
    Completed,
    Reviewed,
    Cancelled,
}

/// One record in the task history. Records are appended on assignment and
/// advance through the status machine by field update, never by deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub task_id: String,
    /// Human-readable name of the work assigned (workflow stage name).
    pub task_name: String,
    pub user: String,
    pub reviewer: Option<String>,
    pub status: TaskStatus,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub on_time: bool,
    pub efficiency_score: f64,
}

/// One row of the derived leaderboard, per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: String,
    pub completed: u32,
    pub avg_efficiency: f64,
    pub on_time: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// External subsystem types
// ─────────────────────────────────────────────────────────────────────────────

/// An item tracked by the inventory subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub current_level: f64,
    pub low_stock_threshold: f64,
    pub unit: String,
}

/// Snapshot of inventory health as reported by the inventory subsystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryStatus {
    pub total_items: u32,
    #[serde(default)]
    pub low_stock_items: Vec<InventoryItem>,
    #[serde(default)]
    pub empty_items: Vec<InventoryItem>,
}

/// A task owned by the external task subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalTask {
    pub id: String,
    pub name: String,
    pub status: String,
}
