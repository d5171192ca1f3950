// IAC Bridge Core - Domain Logic & Ports
// NO infrastructure dependencies (hexagonal architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::BridgeService;
pub use domain::{BridgeResult, Command, Invocation, Operation, ProcessOutcome};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
