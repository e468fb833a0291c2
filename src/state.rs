//! Shared application state. Everything is immutable after startup except the store's connection.

use crate::compiler::{Route, RouteTable};
use crate::config::ServerConfig;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub routes: Arc<RouteTable>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Store, routes: RouteTable, config: ServerConfig) -> Self {
        AppState {
            store: Arc::new(store),
            routes: Arc::new(routes),
            config: Arc::new(config),
        }
    }
}

/// State for one compiled path: every route declared there, one per method.
#[derive(Clone)]
pub struct Endpoint {
    pub app: AppState,
    pub routes: Arc<[Route]>,
}
