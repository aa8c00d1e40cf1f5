//! Event publishing route.
//!
//! Collaborators (the inventory and task subsystems, schedulers) push typed
//! events here; delivery to in-process subscribers is best-effort.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use hearth_core::bus::HomeEvent;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/events", post(publish_event))
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub delivered: usize,
}

async fn publish_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<HomeEvent>,
) -> Json<PublishResponse> {
    let delivered = state.bus.publish(event).await;
    Json(PublishResponse { delivered })
}
