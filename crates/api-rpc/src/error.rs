//! RPC Error Types
//!
//! Maps bridge results to JSON-RPC error codes.

use iac_bridge_core::BridgeResult;
use jsonrpsee::types::ErrorObjectOwned;
use serde_json::json;
use thiserror::Error;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const THROTTLED: i32 = 4003;
    pub const SYSTEM_ERROR: i32 = 5002;
    pub const BACKEND_FAILED: i32 = 5003;
    pub const DECODE_FAILED: i32 = 5004;
    pub const BACKEND_TIMEOUT: i32 = 5005;
}

/// Message used for backend output that is not JSON
pub const DECODE_FAILED_MESSAGE: &str = "Failed to parse response";

/// Server lifecycle errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to build server on {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Failed to register method {method}: {reason}")]
    Register { method: &'static str, reason: String },
}

/// Success becomes the result verbatim; every failure becomes an error object
/// whose `data` keeps the backend's diagnostics.
pub fn into_rpc_result(result: BridgeResult) -> Result<serde_json::Value, ErrorObjectOwned> {
    match result {
        BridgeResult::Success { payload } => Ok(payload),
        BridgeResult::ExecutionError { message } => Err(ErrorObjectOwned::owned(
            code::BACKEND_FAILED,
            message.clone(),
            Some(json!({ "error": message })),
        )),
        BridgeResult::DecodeError { raw_output } => Err(ErrorObjectOwned::owned(
            code::DECODE_FAILED,
            DECODE_FAILED_MESSAGE,
            Some(json!({ "raw": raw_output })),
        )),
        BridgeResult::SpawnError { message } => Err(ErrorObjectOwned::owned(
            code::SYSTEM_ERROR,
            format!("Backend could not be started: {}", message),
            None::<()>,
        )),
        BridgeResult::TimeoutError { timeout_ms } => Err(ErrorObjectOwned::owned(
            code::BACKEND_TIMEOUT,
            format!("Backend timed out after {}ms", timeout_ms),
            Some(json!({ "timeout_ms": timeout_ms })),
        )),
    }
}

pub fn throttled() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}

/// Re-code jsonrpsee's param parse failure as a validation error
pub fn invalid_params(err: ErrorObjectOwned) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code::VALIDATION_ERROR, err.message().to_string(), None::<()>)
}
