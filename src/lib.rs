//! sqlroute: a directory of SQL files served as a REST API over SQLite.
//!
//! `Tables/<table>/<METHOD>/<name>.sql` becomes `{base}/<table>/<name>`, and
//! `<METHOD>/<name>.sql` becomes `{base}/<name>`. Requests render the file's
//! `{{placeholder}}` template, bind parameters positionally and return a JSON envelope.

pub mod app;
pub mod client;
pub mod compiler;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod scaffold;
pub mod server;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use app::prepare;
pub use client::{Namespace, NamespaceSet, Operation, RemoteClient};
pub use compiler::{compile, HttpMethod, Route, RouteDescriptor, RouteTable};
pub use config::ServerConfig;
pub use error::{AppError, ClientError, CompileError, ConfigError, DiscoveryError, StartupError, StoreError};
pub use response::{DebugInfo, Envelope};
pub use routes::build_router;
pub use service::ExecutionService;
pub use sql::ParameterSet;
pub use state::AppState;
pub use store::{ExecutionResult, Store};
