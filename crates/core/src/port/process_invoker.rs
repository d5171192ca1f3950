// Process Invoker Port
// Abstraction for running the backend as a child process

use crate::domain::{Invocation, ProcessOutcome};
use async_trait::async_trait;
use thiserror::Error;

/// Invocation errors (the process never produced a complete outcome)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process timeout after {0}ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Process Invoker trait
///
/// Implementations:
/// - SubprocessInvoker (infra-system): tokio child process with piped streams
/// - MockProcessInvoker: scripted outcomes for tests
#[async_trait]
pub trait ProcessInvoker: Send + Sync {
    /// Start exactly one child process and wait until it has exited and both
    /// of its output streams are drained.
    ///
    /// # Errors
    /// - InvokeError::SpawnFailed if the process cannot be created
    /// - InvokeError::Timeout if the process outlives its deadline (it is killed)
    /// - InvokeError::IoError if reading the pipes or waiting fails
    async fn invoke(&self, invocation: Invocation) -> Result<ProcessOutcome, InvokeError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock invoker behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with the given code and stream contents
        Exit {
            code: i32,
            stdout: Vec<u8>,
            stderr: Vec<u8>,
        },
        /// Fail before a process exists
        Fail(InvokeError),
        /// Echo the invocation argv back as a JSON array on stdout
        EchoArgs,
    }

    /// Mock Process Invoker for testing
    pub struct MockProcessInvoker {
        behavior: Arc<Mutex<MockBehavior>>,
        delay: Duration,
        invocations: Arc<Mutex<Vec<Invocation>>>,
        running: AtomicUsize,
        peak_running: AtomicUsize,
    }

    impl MockProcessInvoker {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                delay: Duration::ZERO,
                invocations: Arc::new(Mutex::new(Vec::new())),
                running: AtomicUsize::new(0),
                peak_running: AtomicUsize::new(0),
            }
        }

        pub fn new_exit(code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
            Self::new(MockBehavior::Exit {
                code,
                stdout: stdout.into(),
                stderr: stderr.into(),
            })
        }

        pub fn new_success(stdout: impl Into<Vec<u8>>) -> Self {
            Self::new_exit(0, stdout, Vec::new())
        }

        pub fn new_fail(error: InvokeError) -> Self {
            Self::new(MockBehavior::Fail(error))
        }

        pub fn new_echo() -> Self {
            Self::new(MockBehavior::EchoArgs)
        }

        /// Simulate a process that runs for `delay` before exiting
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            self.invocations.lock().unwrap().len()
        }

        pub fn invocations(&self) -> Vec<Invocation> {
            self.invocations.lock().unwrap().clone()
        }

        /// Highest number of simultaneously running fake processes seen
        pub fn peak_concurrency(&self) -> usize {
            self.peak_running.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProcessInvoker for MockProcessInvoker {
        async fn invoke(&self, invocation: Invocation) -> Result<ProcessOutcome, InvokeError> {
            self.invocations.lock().unwrap().push(invocation.clone());

            let behavior = self.behavior.lock().unwrap().clone();
            let (code, stdout, stderr) = match behavior {
                MockBehavior::Fail(err) => return Err(err),
                MockBehavior::Exit {
                    code,
                    stdout,
                    stderr,
                } => (code, stdout, stderr),
                MockBehavior::EchoArgs => {
                    let echoed = serde_json::to_vec(invocation.args())
                        .map_err(|e| InvokeError::IoError(e.to_string()))?;
                    (0, echoed, Vec::new())
                }
            };

            let now_running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_running.fetch_max(now_running, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.running.fetch_sub(1, Ordering::SeqCst);

            Ok(ProcessOutcome::new(code, stdout, stderr))
        }
    }
}
