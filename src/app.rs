//! Startup sequence shared by the binary and the integration tests.

use crate::compiler::compile;
use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::scaffold::{is_complete, Layout};
use crate::sql::normalize_schema;
use crate::state::AppState;
use crate::store::Store;
use std::path::Path;

/// Schema script contents, or `None` when the file is missing or holds only comments.
pub fn read_schema(path: &Path) -> Result<Option<String>, StartupError> {
    match std::fs::read_to_string(path) {
        Ok(s) if normalize_schema(&s).is_empty() => Ok(None),
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StartupError::SchemaRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Scaffold (when enabled or the layout is incomplete), open the store with the schema,
/// compile the SQL tree and bundle everything into the shared state.
pub async fn prepare(config: ServerConfig) -> Result<AppState, StartupError> {
    if config.scaffold || !is_complete(&config) {
        Layout::new(&config.sql_root)
            .scaffold()
            .map_err(StartupError::Scaffold)?;
    }

    let schema = read_schema(&config.schema_path())?;
    let store = Store::open(&config.database_path, schema.as_deref()).await?;
    if let Ok(tables) = store.list_tables().await {
        tracing::info!(tables = ?tables, "schema applied");
    }

    let routes = compile(&config.sql_root, &config.base_url)?;
    if routes.is_empty() {
        tracing::warn!(root = %config.sql_root.display(), "no sql files found; only system endpoints are served");
    }
    Ok(AppState::new(store, routes, config))
}
