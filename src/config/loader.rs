//! Load server config from `SQLROUTE_*` environment variables over the defaults.

use crate::config::{normalize_base_url, validate, ServerConfig};
use crate::error::ConfigError;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "SQLROUTE_";

/// Read config from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
pub fn from_env() -> Result<ServerConfig, ConfigError> {
    from_lookup(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())
}

/// Build config from an arbitrary key lookup (keys without prefix, e.g. `PORT`).
pub fn from_lookup<F>(lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ServerConfig::default();

    if let Some(v) = lookup("SQL_ROOT") {
        config.sql_root = PathBuf::from(v);
    }
    if let Some(v) = lookup("DB_PATH") {
        config.database_path = PathBuf::from(v);
    }
    if let Some(v) = lookup("BASE_URL") {
        config.base_url = v;
    }
    if let Some(v) = lookup("HOST") {
        config.host = v;
    }
    if let Some(v) = lookup("PORT") {
        let port: u32 = v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: v.clone() })?;
        if port == 0 || port > u16::MAX as u32 {
            return Err(ConfigError::InvalidPort(port));
        }
        config.port = port as u16;
    }
    if let Some(v) = lookup("CORS") {
        config.enable_cors = parse_bool("CORS", &v)?;
    }
    if let Some(v) = lookup("DEBUG") {
        config.debug = parse_bool("DEBUG", &v)?;
    }
    if let Some(v) = lookup("SCAFFOLD") {
        config.scaffold = parse_bool("SCAFFOLD", &v)?;
    }
    if let Some(v) = lookup("KEEP_ALIVE") {
        config.keep_alive = parse_bool("KEEP_ALIVE", &v)?;
    }
    if let Some(v) = lookup("IDLE_TIMEOUT_SECS") {
        config.idle_timeout_secs = v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key: "IDLE_TIMEOUT_SECS", value: v.clone() })?;
    }
    if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
        config.request_timeout_secs = v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key: "REQUEST_TIMEOUT_SECS", value: v.clone() })?;
    }

    config.base_url = normalize_base_url(&config.base_url);
    validate(&config)?;
    Ok(config)
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: value.to_string() }),
    }
}
