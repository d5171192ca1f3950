// Command / Invocation Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of the argument encoding shared with the backend.
/// Bump the version whenever the argv layout or the encoding changes.
pub const WIRE_FORMAT: &str = "json/v1";

/// Environment variable the backend can read to check `WIRE_FORMAT`
pub const WIRE_FORMAT_ENV: &str = "IAC_BRIDGE_WIRE_FORMAT";

/// Backend operations (the first positional argument of every invocation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Network structure without running a simulation
    Info,
    /// Run a simulation over the selected nodes
    Run,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Info => "info",
            Operation::Run => "run",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "info" => Ok(Operation::Info),
            "run" => Ok(Operation::Run),
            other => Err(DomainError::UnknownOperation(other.to_string())),
        }
    }
}

/// Logical backend command: operation literal followed by serialized arguments.
///
/// `arguments[0]` is always the operation literal. Order is part of the
/// backend contract and is never changed after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    operation: Operation,
    arguments: Vec<String>,
}

impl Command {
    pub(crate) fn new(operation: Operation, serialized_args: Vec<String>) -> Self {
        let mut arguments = Vec::with_capacity(serialized_args.len() + 1);
        arguments.push(operation.as_str().to_string());
        arguments.extend(serialized_args);
        Self {
            operation,
            arguments,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

/// Where the backend lives: executable plus the arguments that precede every
/// command (e.g. `python3` + `["iac_bridge.py"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSpec {
    pub program: String,
    #[serde(default)]
    pub base_args: Vec<String>,
}

impl BackendSpec {
    pub fn new(program: impl Into<String>, base_args: Vec<String>) -> Result<Self> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "backend program must not be empty".to_string(),
            ));
        }
        Ok(Self { program, base_args })
    }

    /// Resolve a command against this backend
    pub fn invocation(&self, command: Command) -> Invocation {
        let mut args = self.base_args.clone();
        args.extend(command.arguments);
        Invocation {
            program: self.program.clone(),
            args,
            operation: command.operation,
        }
    }
}

/// Concrete process start specification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    operation: Operation,
}

impl Invocation {
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector (base args followed by the command arguments)
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }
}
