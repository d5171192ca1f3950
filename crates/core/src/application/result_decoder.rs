// Result Decoder - process outcome -> BridgeResult

use crate::domain::{BridgeResult, ProcessOutcome};
use crate::port::InvokeError;
use tracing::{debug, warn};

pub struct ResultDecoder;

impl ResultDecoder {
    /// Classify a finished process.
    ///
    /// Non-zero exit is an execution failure carrying stderr; stdout is only
    /// consulted when stderr is blank (backends that print `{"error": ...}`).
    /// Exit 0 requires stdout to be exactly one JSON document.
    pub fn decode(outcome: &ProcessOutcome) -> BridgeResult {
        if !outcome.success() {
            let message = Self::failure_message(outcome);
            warn!(
                exit_code = outcome.exit_code,
                message = %message,
                "Backend reported execution failure"
            );
            return BridgeResult::ExecutionError { message };
        }

        if !outcome.stderr.is_empty() {
            debug!(stderr = %outcome.stderr_text(), "Backend wrote to stderr on success");
        }

        match serde_json::from_slice::<serde_json::Value>(&outcome.stdout) {
            Ok(payload) => BridgeResult::Success { payload },
            Err(e) => {
                let raw_output = outcome.stdout_text();
                warn!(
                    error = %e,
                    stdout_bytes = outcome.stdout.len(),
                    "Backend output is not a JSON document"
                );
                BridgeResult::DecodeError { raw_output }
            }
        }
    }

    /// Express an invocation failure as a BridgeResult
    pub fn from_invoke_error(err: InvokeError) -> BridgeResult {
        match err {
            InvokeError::Timeout(timeout_ms) => BridgeResult::TimeoutError { timeout_ms },
            InvokeError::SpawnFailed(message) => BridgeResult::SpawnError { message },
            // Pipe or wait failures leave no trustworthy outcome
            other @ InvokeError::IoError(_) => BridgeResult::ExecutionError {
                message: other.to_string(),
            },
        }
    }

    fn failure_message(outcome: &ProcessOutcome) -> String {
        let stderr = outcome.stderr_text();
        if !stderr.trim().is_empty() {
            return stderr;
        }

        serde_json::from_slice::<serde_json::Value>(&outcome.stdout)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| format!("backend exited with status {}", outcome.exit_code))
    }
}
