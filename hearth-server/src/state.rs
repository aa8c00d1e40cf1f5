//! Application state.

use std::sync::Arc;
use std::time::Instant;

use hearth_core::bus::{EventBus, HomeEvent};
use hearth_core::notify::Notifier;
use hearth_core::workflow::EngineEffect;
use hearth_core::StateStore;
use tracing::debug;

use crate::config::Config;

/// Shared application state
#[allow(dead_code)]
pub struct AppState {
    /// Server configuration
    pub config: Config,
    /// Owner of the live system state
    pub store: Arc<StateStore>,
    /// In-process event bus
    pub bus: EventBus,
    /// Assignment notifications
    pub notifier: Arc<dyn Notifier>,
    /// Whether orchestration connected at startup (false = legacy mode)
    pub orchestration_enabled: bool,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<StateStore>,
        bus: EventBus,
        notifier: Arc<dyn Notifier>,
        orchestration_enabled: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            bus,
            notifier,
            orchestration_enabled,
            start_time: Instant::now(),
        })
    }

    /// Execute the side effects an engine pass returned: notify the people
    /// involved and publish the matching bus events. Runs outside the state
    /// lock.
    pub async fn apply_effects(&self, effects: Vec<EngineEffect>) {
        for effect in effects {
            match effect {
                EngineEffect::TaskAssigned {
                    task_id,
                    task_name,
                    user,
                    reviewer,
                    ..
                } => {
                    self.notifier.notify(
                        &user,
                        &format!("You've been assigned a new task: {task_name}"),
                    );
                    if let Some(reviewer) = &reviewer {
                        self.notifier.notify(
                            reviewer,
                            &format!("You'll review '{task_name}' once {user} completes it"),
                        );
                    }
                    self.bus
                        .publish(HomeEvent::TaskAssigned {
                            task_id,
                            task_name,
                            user_id: user,
                            assigned_by: "hearth".to_string(),
                        })
                        .await;
                }
                EngineEffect::WorkflowFinished {
                    pile_path,
                    workflow,
                } => {
                    debug!(
                        pile_path = %pile_path.join("/"),
                        workflow = workflow.slug(),
                        "workflow cycle finished"
                    );
                }
            }
        }
    }
}
