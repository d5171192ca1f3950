// Command Builder - logical operation -> positional backend arguments

use crate::domain::error::Result;
use crate::domain::{Command, Operation};
use serde_json::Value;

/// Stateless builder for backend commands.
///
/// Every argument is encoded as one compact JSON document, so a structured
/// value always occupies exactly one argv slot and needs no shell escaping.
pub struct CommandBuilder;

impl CommandBuilder {
    /// Build a command from an operation name as received from a router
    ///
    /// # Errors
    /// - DomainError::UnknownOperation if `operation` is not `info` or `run`
    pub fn build(operation: &str, args: &[Value]) -> Result<Command> {
        let operation: Operation = operation.parse()?;
        Ok(Self::build_for(operation, args))
    }

    /// Build a command for an already-validated operation
    pub fn build_for(operation: Operation, args: &[Value]) -> Command {
        Command::new(operation, args.iter().map(serialize).collect())
    }

    /// `info`
    pub fn info() -> Command {
        Self::build_for(Operation::Info, &[])
    }

    /// `run <selected_nodes> <params>`
    pub fn run(selected_nodes: &Value, params: &Value) -> Command {
        Command::new(
            Operation::Run,
            vec![serialize(selected_nodes), serialize(params)],
        )
    }
}

/// Encode a value for the `json/v1` wire format
pub fn serialize(value: &Value) -> String {
    value.to_string()
}
