//! Router assembly.

pub mod common;
pub mod compiled;
pub use common::*;
pub use compiled::*;

use crate::handlers::not_found;
use crate::state::AppState;
use axum::Router;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Full application router: system endpoints, every compiled route, and the HTTP layers.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let mut router = common_routes(state.clone())
        .merge(compiled_routes(state))
        .fallback(not_found);
    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
}
