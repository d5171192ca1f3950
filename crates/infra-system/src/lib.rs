// IAC Bridge Infrastructure - System Adapters
// Implements: ProcessInvoker (tokio child processes)

pub mod output_aggregator;
pub mod subprocess_invoker;

pub use output_aggregator::{AggregatedOutput, OutputAggregator};
pub use subprocess_invoker::{InvokerConfig, SubprocessInvoker};
