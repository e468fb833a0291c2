//! Resolved server configuration. Treated as opaque input by the compiler and executor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SQL_ROOT: &str = "sqlroute_dir/db";
pub const DEFAULT_DB_PATH: &str = "sqlroute_dir/app.db";
pub const DEFAULT_BASE_URL: &str = "/api/v1";
pub const DEFAULT_PORT: u16 = 8080;
pub const SCHEMA_FILE: &str = "schema.sql";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root of the SQL file tree.
    pub sql_root: PathBuf,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Prefix for every compiled route, normalized to `/segment` form or empty.
    pub base_url: String,
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// Attach `debug` blocks (including the rendered SQL) to responses.
    pub debug: bool,
    pub request_timeout_secs: u64,
    /// Bound on reading a request head, which includes the wait for the next request on an
    /// idle keep-alive connection. `0` disables it.
    pub idle_timeout_secs: u64,
    pub keep_alive: bool,
    /// Create the directory convention and default templates on startup when missing.
    pub scaffold: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            sql_root: PathBuf::from(DEFAULT_SQL_ROOT),
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            base_url: DEFAULT_BASE_URL.into(),
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            enable_cors: true,
            debug: false,
            request_timeout_secs: 15,
            idle_timeout_secs: 30,
            keep_alive: true,
            scaffold: true,
        }
    }
}

impl ServerConfig {
    /// Schema script location; always `<sql_root>/schema.sql`.
    pub fn schema_path(&self) -> PathBuf {
        self.sql_root.join(SCHEMA_FILE)
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}
