//! System routes: `GET /health` and `GET /` (endpoint manifest).

use crate::handlers::{health, manifest};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(manifest))
        .route("/health", get(health))
        .with_state(state)
}
