// Bridge Result - the only thing the router ever receives

use serde::{Deserialize, Serialize};

/// Terminal outcome of one bridged request. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BridgeResult {
    /// Backend exited 0 and printed one well-formed JSON document
    Success { payload: serde_json::Value },

    /// Backend exited non-zero; message is its own diagnostic text
    ExecutionError { message: String },

    /// Backend exited 0 but its stdout is not a JSON document
    DecodeError { raw_output: String },

    /// Backend process could not be created at all
    SpawnError { message: String },

    /// Backend did not finish before the deadline and was terminated
    TimeoutError { timeout_ms: u64 },
}

impl BridgeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BridgeResult::Success { .. })
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeResult::Success { .. } => "success",
            BridgeResult::ExecutionError { .. } => "execution_error",
            BridgeResult::DecodeError { .. } => "decode_error",
            BridgeResult::SpawnError { .. } => "spawn_error",
            BridgeResult::TimeoutError { .. } => "timeout_error",
        }
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            BridgeResult::Success { payload } => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape_is_tagged() {
        let result = BridgeResult::DecodeError {
            raw_output: "{\"ok\":".to_string(),
        };

        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            json!({"kind": "decode_error", "raw_output": "{\"ok\":"})
        );
    }

    #[test]
    fn test_payload_only_on_success() {
        let ok = BridgeResult::Success {
            payload: json!({"ok": true}),
        };
        let failed = BridgeResult::ExecutionError {
            message: "boom".to_string(),
        };

        assert_eq!(ok.payload(), Some(&json!({"ok": true})));
        assert!(ok.is_success());
        assert_eq!(failed.payload(), None);
        assert_eq!(failed.kind(), "execution_error");
    }
}
