//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// Hearth CLI
///
/// Household pile, task and leaderboard operations against hearth-server.
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the hearth-server API
    #[arg(
        long,
        global = true,
        env = "HEARTH_SERVER_URL",
        default_value = "http://127.0.0.1:7420"
    )]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pile operations (add value, list)
    Pile(PileCommand),

    /// Task lifecycle (complete)
    Task(TaskCommand),

    /// Review lifecycle (complete)
    Review(ReviewCommand),

    /// Show the leaderboard
    Leaderboard,

    /// Show server health and the pile forest
    Status,

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pile Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct PileCommand {
    #[command(subcommand)]
    pub action: PileAction,
}

#[derive(Subcommand, Debug)]
pub enum PileAction {
    /// Add a signed delta to a pile's value (clamped to its bounds)
    Add {
        /// Pile id
        pile_id: String,
        /// Signed delta, e.g. 3 or -2
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// List the live pile forest
    List,
}

// ─────────────────────────────────────────────────────────────────────────────
// Task Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Mark an assigned task complete
    Complete {
        /// Task id
        task_id: String,
        /// Completing user
        #[arg(short, long)]
        user: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Review Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ReviewCommand {
    #[command(subcommand)]
    pub action: ReviewAction,
}

#[derive(Subcommand, Debug)]
pub enum ReviewAction {
    /// Mark a completed task reviewed
    Complete {
        /// Task id
        task_id: String,
        /// Reviewing user
        #[arg(short, long)]
        reviewer: String,
    },
}
