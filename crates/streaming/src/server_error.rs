use tracing::{error, info, warn};

use crate::encoding::decode_json_payload;

const HEADER: &str = "An error occurred on the visualization server";
const UNKNOWN: &str = "An unknown error occurred on the visualization server.";

/// Severity carried by the `GoType` discriminator of an error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// 0 and 3 are informational, 1 a warning, 2 an error. Anything else
    /// (including a missing discriminator) is treated as informational.
    pub fn from_go_type(go_type: Option<i64>) -> Self {
        match go_type {
            Some(1) => Severity::Warning,
            Some(2) => Severity::Error,
            _ => Severity::Info,
        }
    }
}

/// Structured `error` payload from a response, formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    pub severity: Severity,
    pub message: String,
}

impl ServerError {
    pub fn decode(payload: &serde_json::Value) -> Self {
        if payload.is_null() {
            return Self {
                severity: Severity::Error,
                message: UNKNOWN.to_string(),
            };
        }

        let decoded = match decode_json_payload(payload) {
            Ok(v) => v,
            Err(e) => {
                return Self {
                    severity: Severity::Error,
                    message: format!("{HEADER}\n    {e}"),
                };
            }
        };

        let mut message = HEADER.to_string();
        let mut go_type = None;
        match &decoded {
            serde_json::Value::Object(fields) => {
                go_type = fields.get("GoType").and_then(|v| v.as_i64());
                for (key, value) in fields {
                    message.push_str("\n    ");
                    message.push_str(key);
                    message.push_str(" : ");
                    match value {
                        serde_json::Value::String(s) => message.push_str(s),
                        other => message.push_str(&other.to_string()),
                    }
                }
            }
            serde_json::Value::String(s) => {
                message.push_str("\n    ");
                message.push_str(s);
            }
            other => {
                message.push_str("\n    ");
                message.push_str(&other.to_string());
            }
        }

        Self {
            severity: Severity::from_go_type(go_type),
            message,
        }
    }

    pub fn log(&self) {
        match self.severity {
            Severity::Info => info!("{}", self.message),
            Severity::Warning => warn!("{}", self.message),
            Severity::Error => error!("{}", self.message),
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ServerError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn formats_each_field_on_its_own_line() {
        let payload = json!("%7B%22GoType%22%3A1%2C%22Message%22%3A%22scene+not+found%22%7D");
        let err = ServerError::decode(&payload);
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(
            err.message,
            "An error occurred on the visualization server\n    GoType : 1\n    Message : scene not found"
        );
    }

    #[test]
    fn fields_keep_server_order() {
        let payload = json!("%7B%22Message%22%3A%22boom%22%2C%22GoType%22%3A0%7D");
        let err = ServerError::decode(&payload);
        assert_eq!(err.severity, Severity::Info);
        assert_eq!(
            err.message,
            "An error occurred on the visualization server\n    Message : boom\n    GoType : 0"
        );
    }

    #[test]
    fn nested_values_are_serialized_inline() {
        let err = ServerError::decode(&json!({"GoType": 2, "Detail": {"line": 4}}));
        assert_eq!(err.severity, Severity::Error);
        assert!(err.message.contains("\n    Detail : {\"line\":4}"));
        assert!(err.message.contains("\n    GoType : 2"));
    }

    #[test]
    fn severities_follow_go_type() {
        assert_eq!(Severity::from_go_type(Some(0)), Severity::Info);
        assert_eq!(Severity::from_go_type(Some(3)), Severity::Info);
        assert_eq!(Severity::from_go_type(None), Severity::Info);
        assert_eq!(Severity::from_go_type(Some(1)), Severity::Warning);
        assert_eq!(Severity::from_go_type(Some(2)), Severity::Error);
    }

    #[test]
    fn null_payload_is_unknown_error() {
        let err = ServerError::decode(&serde_json::Value::Null);
        assert_eq!(err.message, UNKNOWN);
    }
}
