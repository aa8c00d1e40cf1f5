//! Orchestration: bridges the inventory and task subsystems via the event
//! bus, without either subsystem depending on the other directly.
//!
//! Failure semantics: a construction-time failure to reach either subsystem
//! degrades orchestration to disabled ("legacy mode") rather than aborting
//! the host process; at runtime, a failure from one subsystem never blocks
//! the other's forward progress.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::bus::HomeEvent;
use crate::clients::{HttpInventoryClient, HttpTaskClient, InventoryApi, TaskApi};
use crate::error::Result;

/// Coordinates between the inventory and task subsystems.
pub struct OrchestrationService {
    inventory: Arc<dyn InventoryApi>,
    tasks: Arc<dyn TaskApi>,
}

impl OrchestrationService {
    pub fn new(inventory: Arc<dyn InventoryApi>, tasks: Arc<dyn TaskApi>) -> Self {
        Self { inventory, tasks }
    }

    /// Connect to both subsystems over HTTP. Either probe failing returns an
    /// error; the caller is expected to run without orchestration in that
    /// case rather than abort.
    pub async fn connect(
        inventory_url: &str,
        task_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let inventory = HttpInventoryClient::connect(inventory_url, timeout).await?;
        let tasks = HttpTaskClient::connect(task_url, timeout).await?;
        Ok(Self::new(Arc::new(inventory), Arc::new(tasks)))
    }

    /// Handle task completion and its potential inventory implications.
    ///
    /// Completion success is independent of inventory-side success: inventory
    /// failures are logged and never roll back or fail the completion.
    pub async fn process_task_completion(&self, task_id: &str, user_id: &str) -> Result<()> {
        info!(task_id, user_id, "processing task completion");

        let task = self.tasks.get_task(task_id).await?;
        let completed = self.tasks.complete_task(task_id).await?;
        info!(
            task_id = %completed.id,
            task_name = %completed.name,
            status = %completed.status,
            "task completed"
        );

        if let Err(err) = self.resolve_inventory_implications(&task.name).await {
            warn!(task_id, error = %err, "failed to process inventory implications");
        }
        Ok(())
    }

    /// Check whether a completed task consumed tracked items, e.g. a cooking
    /// task drawing down ingredients. The task-to-item mapping lives with the
    /// subsystems; here we surface what the completion left low.
    async fn resolve_inventory_implications(&self, task_name: &str) -> Result<()> {
        debug!(task_name, "checking inventory implications");
        let status = self.inventory.status().await?;
        for item in &status.low_stock_items {
            debug!(
                item_name = %item.name,
                level = item.current_level,
                threshold = item.low_stock_threshold,
                "item low after task completion"
            );
        }
        Ok(())
    }

    /// Handle an inventory level change: items at or below their low-stock
    /// threshold get a restock task in the task subsystem.
    pub async fn process_inventory_level_change(
        &self,
        item_id: &str,
        previous_level: f64,
        new_level: f64,
    ) -> Result<()> {
        info!(item_id, previous_level, new_level, "processing inventory level change");

        let status = self.inventory.status().await?;
        if let Some(item) = status.low_stock_items.iter().find(|i| i.id == item_id) {
            info!(
                item_id = %item.id,
                item_name = %item.name,
                level = item.current_level,
                threshold = item.low_stock_threshold,
                "item below threshold, creating restock task"
            );

            let name = format!("Restock {}", item.name);
            let description = format!(
                "Current level: {:.2}{}, threshold: {:.2}{}",
                item.current_level, item.unit, item.low_stock_threshold, item.unit
            );
            self.tasks.add_task(&name, &description, "system").await?;
            info!(task_name = %name, "restock task created");
        }
        Ok(())
    }

    /// Scheduled inventory sweep: log everything low or empty.
    pub async fn scheduled_inventory_check(&self) -> Result<()> {
        info!("performing scheduled inventory check");
        let status = self.inventory.status().await?;

        for item in &status.low_stock_items {
            warn!(
                item_name = %item.name,
                level = item.current_level,
                threshold = item.low_stock_threshold,
                "item below threshold detected during scheduled check"
            );
        }
        for item in &status.empty_items {
            error!(
                item_name = %item.name,
                level = item.current_level,
                "empty item detected during scheduled check"
            );
        }
        info!(
            low_stock_count = status.low_stock_items.len(),
            empty_count = status.empty_items.len(),
            total_items = status.total_items,
            "scheduled inventory check completed"
        );
        Ok(())
    }

    /// Route one bus event to the matching operation. Errors are logged here;
    /// one failed event never stops the dispatch loop.
    pub async fn handle_event(&self, event: HomeEvent) {
        match event {
            HomeEvent::InventoryLevelChanged {
                item_id,
                item_name,
                previous_level,
                new_level,
                below_threshold,
            } => {
                debug!(
                    item_id = %item_id,
                    item_name = %item_name,
                    below_threshold,
                    "handling inventory level changed event"
                );
                if let Err(err) = self
                    .process_inventory_level_change(&item_id, previous_level, new_level)
                    .await
                {
                    error!(item_id = %item_id, error = %err, "inventory level change processing failed");
                }
            }
            HomeEvent::TaskCompleted {
                task_id, user_id, ..
            } => {
                if let Err(err) = self.process_task_completion(&task_id, &user_id).await {
                    error!(task_id = %task_id, error = %err, "task completion processing failed");
                }
            }
            HomeEvent::TaskAssigned { task_id, .. } => {
                // No orchestration action yet; kept for symmetry with the
                // other event kinds.
                debug!(task_id = %task_id, "ignoring task assigned event");
            }
            HomeEvent::ScheduleTrigger {
                trigger_id,
                trigger_name,
                context,
            } => {
                info!(
                    trigger_id = %trigger_id,
                    trigger_name = %trigger_name,
                    "handling schedule trigger event"
                );
                self.handle_schedule_trigger(&context).await;
            }
        }
    }

    async fn handle_schedule_trigger(&self, context: &HashMap<String, String>) {
        match context.get("action").map(String::as_str) {
            Some("inventory_check") => {
                if let Err(err) = self.scheduled_inventory_check().await {
                    error!(error = %err, "scheduled inventory check failed");
                }
            }
            Some(action) => debug!(action, "unknown scheduled action"),
            None => {}
        }
    }

    /// Dispatch loop: consume bus events until the channel closes or
    /// shutdown is signalled.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<HomeEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("orchestration dispatch loop started");
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => break,
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("orchestration dispatch loop stopped");
    }
}
