// Port Layer - Interfaces for external dependencies

pub mod process_invoker;

// Re-exports
pub use process_invoker::{InvokeError, ProcessInvoker};
