//! HTTP API routes.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use hearth_core::Error;

use crate::state::AppState;

pub mod events;
pub mod health;
pub mod leaderboard;
pub mod piles;
pub mod tasks;

/// Create the full API router
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(piles::router())
        .merge(tasks::router())
        .merge(leaderboard::router())
        .merge(events::router())
}

/// Map a core error onto an HTTP response.
pub fn error_response(err: Error) -> (StatusCode, String) {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if matches!(err, Error::DependencyUnavailable { .. }) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}
