//! Task and review completion routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use hearth_core::bus::HomeEvent;
use hearth_core::types::TaskEvent;
use serde::Deserialize;

use crate::routes::error_response;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tasks/complete", post(mark_task_complete))
        .route("/api/reviews/complete", post(mark_review_complete))
}

#[derive(Debug, Deserialize)]
pub struct MarkTaskCompleteRequest {
    pub task_id: String,
    pub user_id: String,
}

/// Move the matching assigned record to completed and advance its workflow
async fn mark_task_complete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarkTaskCompleteRequest>,
) -> Result<Json<TaskEvent>, (StatusCode, String)> {
    let (event, effects) = state
        .store
        .mark_task_complete(&req.task_id, &req.user_id, Utc::now())
        .await
        .map_err(error_response)?;

    state
        .bus
        .publish(HomeEvent::TaskCompleted {
            task_id: event.task_id.clone(),
            task_name: event.task_name.clone(),
            user_id: event.user.clone(),
        })
        .await;
    state.apply_effects(effects).await;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
pub struct MarkReviewCompleteRequest {
    pub task_id: String,
    pub reviewer_id: String,
}

/// Move the matching completed record to reviewed and release its workflow
async fn mark_review_complete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarkReviewCompleteRequest>,
) -> Result<Json<TaskEvent>, (StatusCode, String)> {
    let (event, effects) = state
        .store
        .mark_review_complete(&req.task_id, &req.reviewer_id, Utc::now())
        .await
        .map_err(error_response)?;

    state.apply_effects(effects).await;
    Ok(Json(event))
}
