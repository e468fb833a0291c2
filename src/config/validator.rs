//! Config validation and normalization.

use crate::config::ServerConfig;
use crate::error::ConfigError;

pub fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.port == 0 {
        return Err(ConfigError::InvalidPort(0));
    }
    if config.sql_root.as_os_str().is_empty() {
        return Err(ConfigError::EmptySqlRoot);
    }
    Ok(())
}

/// `api/v1/` -> `/api/v1`, `/` -> ``. Routes are joined as `{base}/{...}`.
pub fn normalize_base_url(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn normalizes_base_url() {
        assert_eq!(normalize_base_url("/api/v1"), "/api/v1");
        assert_eq!(normalize_base_url("api/v1/"), "/api/v1");
        assert_eq!(normalize_base_url("/"), "");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn empty_root_is_rejected() {
        let config = ServerConfig {
            sql_root: PathBuf::new(),
            ..Default::default()
        };
        assert!(matches!(validate(&config), Err(ConfigError::EmptySqlRoot)));
    }
}
