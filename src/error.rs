//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::path::PathBuf;
use thiserror::Error;

use crate::response::Envelope;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid port: {0} (must be 1-65535)")]
    InvalidPort(u32),
    #[error("sql root directory cannot be empty")]
    EmptySqlRoot,
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Route compilation failure. Only directory-level problems end up here;
/// unreadable files are skipped during the walk.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to walk directory {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store closed")]
    Closed,
    #[error("empty statement")]
    EmptyStatement,
    #[error("failed to apply schema statement '{statement}': {source}")]
    Schema {
        statement: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to open database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-request failure. Always rendered as a failure envelope, never propagated.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("method {got} not allowed, expected {expected}")]
    MethodNotAllowed { got: String, expected: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("execution failed: {0}")]
    Execution(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(Envelope::failure(self.to_string()))).into_response()
    }
}

/// Fatal startup failure; the binary exits with it.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("scaffolding failed: {0}")]
    Scaffold(#[source] std::io::Error),
    #[error("failed to read schema {}: {source}", path.display())]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("server: {0}")]
    Serve(#[source] std::io::Error),
}

/// Client-side lookup failure against a discovered namespace set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),
    #[error("operation not found: {namespace}.{operation}")]
    OperationNotFound { namespace: String, operation: String },
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("invalid manifest: {0}")]
    Manifest(String),
}
