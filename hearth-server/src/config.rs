//! Server configuration.
//!
//! Everything is read from environment variables with defaults, so a bare
//! `hearth-server` in a directory with a `hearth.toml` just works.

use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address the HTTP API binds to
    pub bind_addr: String,
    /// Declarative pile/workflow configuration file
    pub config_path: PathBuf,
    /// State snapshot file
    pub state_path: PathBuf,
    /// How often the configuration is re-read and reconciled
    pub reconcile_interval: Duration,
    /// How often the trigger engine evaluates thresholds and due wakes
    pub trigger_interval: Duration,
    /// How often the state snapshot is written
    pub autosave_interval: Duration,
    /// Base URL of the inventory subsystem
    pub inventory_url: String,
    /// Base URL of the task subsystem
    pub task_service_url: String,
    /// Per-call timeout for subsystem clients
    pub client_timeout: Duration,
    /// Event bus per-subscriber channel capacity
    pub bus_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7420".to_string(),
            config_path: PathBuf::from("hearth.toml"),
            state_path: PathBuf::from("state.json"),
            reconcile_interval: Duration::from_secs(30),
            trigger_interval: Duration::from_secs(5),
            autosave_interval: Duration::from_secs(60),
            inventory_url: "http://127.0.0.1:7421".to_string(),
            task_service_url: "http://127.0.0.1:7422".to_string(),
            client_timeout: Duration::from_secs(5),
            bus_capacity: 64,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults field by field.
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_or("HEARTH_BIND_ADDR", defaults.bind_addr),
            config_path: PathBuf::from(env_or(
                "HEARTH_CONFIG",
                defaults.config_path.display().to_string(),
            )),
            state_path: PathBuf::from(env_or(
                "HEARTH_STATE",
                defaults.state_path.display().to_string(),
            )),
            reconcile_interval: env_secs_or(
                "HEARTH_RECONCILE_INTERVAL_SECS",
                defaults.reconcile_interval,
            ),
            trigger_interval: env_secs_or(
                "HEARTH_TRIGGER_INTERVAL_SECS",
                defaults.trigger_interval,
            ),
            autosave_interval: env_secs_or(
                "HEARTH_AUTOSAVE_INTERVAL_SECS",
                defaults.autosave_interval,
            ),
            inventory_url: env_or("HEARTH_INVENTORY_URL", defaults.inventory_url),
            task_service_url: env_or("HEARTH_TASK_SERVICE_URL", defaults.task_service_url),
            client_timeout: env_secs_or("HEARTH_CLIENT_TIMEOUT_SECS", defaults.client_timeout),
            bus_capacity: std::env::var("HEARTH_BUS_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bus_capacity),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default,
    }
}

fn env_secs_or(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
