// Application Layer - Bridge use cases

pub mod admission;
pub mod bridge;
pub mod command_builder;
pub mod constants;
pub mod result_decoder;

// Re-exports
pub use admission::AdmissionControl;
pub use bridge::{BridgeService, BridgeStats};
pub use command_builder::CommandBuilder;
pub use result_decoder::ResultDecoder;
