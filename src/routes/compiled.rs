//! One axum route per compiled path. Every method is accepted so that undeclared ones get
//! a JSON 405 envelope and OPTIONS is always answered.

use crate::handlers::dispatch;
use crate::state::{AppState, Endpoint};
use axum::{routing::any, Router};

/// Register every path of the route table. The compiler only emits routable paths.
pub fn compiled_routes(state: AppState) -> Router {
    let mut router = Router::new();
    for (path, routes) in state.routes.by_path() {
        let methods: Vec<&str> = routes.iter().map(|r| r.descriptor.method().as_str()).collect();
        tracing::info!(path = %path, methods = ?methods, "registered route");
        let endpoint = Endpoint {
            app: state.clone(),
            routes: routes.into_iter().cloned().collect(),
        };
        router = router.merge(Router::new().route(path, any(dispatch)).with_state(endpoint));
    }
    router
}
