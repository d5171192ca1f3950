//! JSON-RPC API Layer
//!
//! Thin router in front of the bridge: decodes request params, forwards them
//! to `BridgeService` and maps each `BridgeResult` onto a JSON-RPC response.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
