//! Standard response envelope: `{success, data?, error?, debug?}`.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Only present when the server runs with debug enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// Diagnostics attached to responses in debug mode. Carries the rendered statement,
/// so it must never be sent in production.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DebugInfo {
    pub method: String,
    pub sql_path: String,
    pub is_universal: bool,
    pub table_name: Option<String>,
    pub processed_sql: String,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            error: None,
            debug: None,
        }
    }

    pub fn with_debug(mut self, debug: Option<DebugInfo>) -> Self {
        self.debug = debug;
        self
    }
}

impl Envelope<serde_json::Value> {
    pub fn failure(message: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            error: Some(message.into()),
            debug: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_omits_data_and_debug() {
        let body = serde_json::to_value(Envelope::failure("boom")).unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn success_carries_debug_when_set() {
        let debug = DebugInfo {
            method: "GET".into(),
            sql_path: "Tables/users/GET/select.sql".into(),
            is_universal: false,
            table_name: Some("users".into()),
            processed_sql: "SELECT * FROM users;".into(),
        };
        let body = serde_json::to_value(Envelope::success(1).with_debug(Some(debug))).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], 1);
        assert_eq!(body["debug"]["table_name"], "users");
        assert!(body.get("error").is_none());
    }
}
