//! Built-in endpoints: `/health`, the `/` manifest and the not-found fallback.

use crate::compiler::HttpMethod;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthBody {
    pub status: String,
    pub endpoints: usize,
    pub port: u16,
    pub timestamp: String,
    pub database: String,
}

/// One entry of the `/` manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EndpointInfo {
    pub method: HttpMethod,
    pub path: String,
    pub universal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Only published in debug mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_path: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Manifest {
    pub message: String,
    pub endpoints: Vec<EndpointInfo>,
}

/// 200 with `status: healthy` while the store answers; 503 `degraded` otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    let healthy = state.store.is_healthy().await;
    let (code, status, database) = if healthy {
        (StatusCode::OK, "healthy", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };
    (
        code,
        Json(HealthBody {
            status: status.into(),
            endpoints: state.routes.len(),
            port: state.config.port,
            timestamp: chrono::Utc::now().to_rfc3339(),
            database: database.into(),
        }),
    )
}

pub async fn manifest(State(state): State<AppState>) -> Json<Manifest> {
    let debug = state.config.debug;
    let endpoints = state
        .routes
        .descriptors()
        .map(|d| EndpointInfo {
            method: d.method(),
            path: d.path().to_string(),
            universal: d.is_universal(),
            table: d.table_name().map(str::to_string),
            sql_path: debug.then(|| d.sql_path().to_string()),
        })
        .collect();
    Json(Manifest {
        message: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        endpoints,
    })
}

/// Fallback for paths no route claims.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
