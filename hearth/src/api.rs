//! API client for connecting to hearth-server.

use anyhow::{bail, Context, Result};
use hearth_core::types::{LeaderboardEntry, Pile, TaskEvent};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// HTTP client for the hearth-server API
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub orchestration_enabled: bool,
}

#[derive(Debug, Serialize)]
struct AddPileValueRequest<'a> {
    pile_id: &'a str,
    delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddPileValueResponse {
    pub pile_id: String,
    pub value: i64,
}

#[derive(Debug, Serialize)]
struct MarkTaskCompleteRequest<'a> {
    task_id: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct MarkReviewCompleteRequest<'a> {
    task_id: &'a str,
    reviewer_id: &'a str,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Check if the server is available
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/health").await
    }

    /// List the live pile forest
    pub async fn list_piles(&self) -> Result<Vec<Pile>> {
        self.get("/api/piles").await
    }

    /// Apply a signed delta to a pile
    pub async fn add_pile_value(&self, pile_id: &str, delta: i64) -> Result<AddPileValueResponse> {
        self.post("/api/piles/value", &AddPileValueRequest { pile_id, delta })
            .await
    }

    /// Mark an assigned task complete
    pub async fn complete_task(&self, task_id: &str, user_id: &str) -> Result<TaskEvent> {
        self.post(
            "/api/tasks/complete",
            &MarkTaskCompleteRequest { task_id, user_id },
        )
        .await
    }

    /// Mark a completed task reviewed
    pub async fn complete_review(&self, task_id: &str, reviewer_id: &str) -> Result<TaskEvent> {
        self.post(
            "/api/reviews/complete",
            &MarkReviewCompleteRequest {
                task_id,
                reviewer_id,
            },
        )
        .await
    }

    /// Fetch the leaderboard
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.get("/api/leaderboard").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed - is hearth-server running?"))?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed - is hearth-server running?"))?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            bail!("server returned {status}: {message}");
        }
        resp.json().await.context("failed to decode response")
    }
}
