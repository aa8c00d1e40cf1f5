//! Pile routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use hearth_core::types::Pile;
use serde::{Deserialize, Serialize};

use crate::routes::error_response;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/piles", get(list_piles))
        .route("/api/piles/value", post(add_pile_value))
}

/// List the live pile forest
async fn list_piles(State(state): State<Arc<AppState>>) -> Json<Vec<Pile>> {
    Json(state.store.piles().await)
}

#[derive(Debug, Deserialize)]
pub struct AddPileValueRequest {
    pub pile_id: String,
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct AddPileValueResponse {
    pub pile_id: String,
    pub value: i64,
}

/// Apply a signed delta to a pile, clamped to its bounds
async fn add_pile_value(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddPileValueRequest>,
) -> Result<Json<AddPileValueResponse>, (StatusCode, String)> {
    let value = state
        .store
        .add_pile_value(&req.pile_id, req.delta)
        .await
        .map_err(error_response)?;
    Ok(Json(AddPileValueResponse {
        pile_id: req.pile_id,
        value,
    }))
}
