// Domain Layer - Pure request/response model of the bridge

pub mod command;
pub mod error;
pub mod outcome;
pub mod result;

// Re-exports
pub use command::{BackendSpec, Command, Invocation, Operation, WIRE_FORMAT, WIRE_FORMAT_ENV};
pub use error::DomainError;
pub use outcome::ProcessOutcome;
pub use result::BridgeResult;
