//! Thin clients for the external inventory and task subsystems.
//!
//! The subsystems are independently owned; this module defines the trait
//! seams the orchestration layer depends on, plus HTTP implementations.
//! Every call is bounded by the configured timeout so a stalled subsystem
//! cannot stall the orchestration path.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{ExternalTask, InventoryItem, InventoryStatus};

/// Inventory subsystem operations used by orchestration.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn status(&self) -> Result<InventoryStatus>;
    async fn update_level(&self, item_id: &str, new_level: f64, reason: &str)
        -> Result<InventoryItem>;
}

/// Task subsystem operations used by orchestration.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn get_task(&self, task_id: &str) -> Result<ExternalTask>;
    async fn complete_task(&self, task_id: &str) -> Result<ExternalTask>;
    async fn add_task(&self, name: &str, description: &str, user_id: &str) -> Result<ExternalTask>;
}

fn build_client(timeout: Duration, service: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::unavailable(service, e))
}

// ─────────────────────────────────────────────────────────────────────────────
// Inventory client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the inventory subsystem.
pub struct HttpInventoryClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpInventoryClient {
    /// Build a client and probe the subsystem. A failed probe surfaces as
    /// `DependencyUnavailable` so the caller can degrade instead of abort.
    pub async fn connect(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Self {
            base_url: base_url.into(),
            client: build_client(timeout, "inventory")?,
        };
        client.status().await?;
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryClient {
    async fn status(&self) -> Result<InventoryStatus> {
        let resp = self
            .client
            .get(self.url("/api/inventory/status"))
            .send()
            .await
            .map_err(|e| Error::unavailable("inventory", e))?;
        resp.error_for_status_ref()
            .map_err(|e| Error::unavailable("inventory", e))?;
        resp.json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    async fn update_level(
        &self,
        item_id: &str,
        new_level: f64,
        reason: &str,
    ) -> Result<InventoryItem> {
        #[derive(Serialize)]
        struct UpdateLevelRequest<'a> {
            item_id: &'a str,
            new_level: f64,
            reason: &'a str,
            record_consumption: bool,
        }

        debug!(item_id, new_level, "updating inventory level");
        let resp = self
            .client
            .post(self.url("/api/inventory/level"))
            .json(&UpdateLevelRequest {
                item_id,
                new_level,
                reason,
                record_consumption: true,
            })
            .send()
            .await
            .map_err(|e| Error::unavailable("inventory", e))?;
        resp.error_for_status_ref()
            .map_err(|e| Error::unavailable("inventory", e))?;
        resp.json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Task client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the task subsystem.
pub struct HttpTaskClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTaskClient {
    /// Build a client and probe the subsystem.
    pub async fn connect(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Self {
            base_url: base_url.into(),
            client: build_client(timeout, "tasks")?,
        };
        let resp = client
            .client
            .get(client.url("/health"))
            .send()
            .await
            .map_err(|e| Error::unavailable("tasks", e))?;
        resp.error_for_status()
            .map_err(|e| Error::unavailable("tasks", e))?;
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl TaskApi for HttpTaskClient {
    async fn get_task(&self, task_id: &str) -> Result<ExternalTask> {
        let resp = self
            .client
            .get(self.url(&format!("/api/tasks/{task_id}")))
            .send()
            .await
            .map_err(|e| Error::unavailable("tasks", e))?;
        resp.error_for_status_ref()
            .map_err(|e| Error::unavailable("tasks", e))?;
        resp.json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    async fn complete_task(&self, task_id: &str) -> Result<ExternalTask> {
        let resp = self
            .client
            .post(self.url(&format!("/api/tasks/{task_id}/complete")))
            .send()
            .await
            .map_err(|e| Error::unavailable("tasks", e))?;
        resp.error_for_status_ref()
            .map_err(|e| Error::unavailable("tasks", e))?;
        resp.json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    async fn add_task(&self, name: &str, description: &str, user_id: &str) -> Result<ExternalTask> {
        #[derive(Serialize)]
        struct AddTaskRequest<'a> {
            name: &'a str,
            description: &'a str,
            user_id: &'a str,
        }

        debug!(name, user_id, "creating external task");
        let resp = self
            .client
            .post(self.url("/api/tasks"))
            .json(&AddTaskRequest {
                name,
                description,
                user_id,
            })
            .send()
            .await
            .map_err(|e| Error::unavailable("tasks", e))?;
        resp.error_for_status_ref()
            .map_err(|e| Error::unavailable("tasks", e))?;
        resp.json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}
