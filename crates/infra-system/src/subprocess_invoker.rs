// Subprocess invoker implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::output_aggregator::{AggregatedOutput, OutputAggregator};
use iac_bridge_core::application::constants::{
    DEFAULT_ENV_ALLOWLIST, DEFAULT_INVOKE_TIMEOUT_MS, GRACEFUL_SHUTDOWN_TIMEOUT_MS,
    KILL_POLL_INTERVAL,
};
use iac_bridge_core::domain::outcome::SIGNALED_EXIT_CODE;
use iac_bridge_core::domain::{Invocation, ProcessOutcome, WIRE_FORMAT, WIRE_FORMAT_ENV};
use iac_bridge_core::port::{InvokeError, ProcessInvoker};

/// Settings shared by every child the invoker starts
#[derive(Debug, Clone)]
pub struct InvokerConfig {
    pub working_dir: PathBuf,
    /// Parent environment variables passed through; everything else is stripped
    pub env_allowlist: Vec<String>,
    /// `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            env_allowlist: DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            timeout: Some(Duration::from_millis(DEFAULT_INVOKE_TIMEOUT_MS)),
        }
    }
}

/// Subprocess invoker
/// Spawns one isolated child per invocation with an allowlisted environment
pub struct SubprocessInvoker {
    config: InvokerConfig,
    aggregator: OutputAggregator,
}

impl SubprocessInvoker {
    /// Create a new subprocess invoker
    ///
    /// # Example
    /// ```ignore
    /// let invoker = SubprocessInvoker::new(InvokerConfig {
    ///     working_dir: "/srv/iac".into(),
    ///     ..Default::default()
    /// });
    /// ```
    pub fn new(config: InvokerConfig) -> Self {
        Self {
            config,
            aggregator: OutputAggregator::new(),
        }
    }

    /// Allowlisted variables taken from the current environment
    fn filtered_env(&self) -> Vec<(String, String)> {
        self.config
            .env_allowlist
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|val| (key.clone(), val)))
            .collect()
    }

    fn build_command(&self, invocation: &Invocation) -> Command {
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.args())
            .current_dir(&self.config.working_dir)
            .env_clear()
            .envs(self.filtered_env())
            .env(WIRE_FORMAT_ENV, WIRE_FORMAT)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reaped even if the caller's future is dropped mid-flight
            .kill_on_drop(true);
        command
    }

    /// Wait for exit and EOF on both pipes, all three concurrently
    async fn collect(&self, child: &mut Child) -> Result<(AggregatedOutput, i32), InvokeError> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| InvokeError::IoError("child stdout was not piped".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| InvokeError::IoError("child stderr was not piped".to_string()))?;

        let (output, status) = tokio::join!(self.aggregator.drain(stdout, stderr), child.wait());

        let output = output.map_err(|e| InvokeError::IoError(e.to_string()))?;
        let status = status.map_err(|e| InvokeError::IoError(e.to_string()))?;
        Ok((output, status.code().unwrap_or(SIGNALED_EXIT_CODE)))
    }

    /// Kill process with SIGTERM first, then SIGKILL if needed
    async fn kill_graceful(&self, child: &mut Child) -> io::Result<()> {
        #[cfg(unix)]
        {
            if let Some(pid) = child.id() {
                use nix::sys::signal::{kill, Signal};
                use nix::unistd::Pid;

                info!(pid = %pid, "Sending SIGTERM to timed-out backend");
                kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(io::Error::from)?;

                let started = Instant::now();
                while started.elapsed() < Duration::from_millis(GRACEFUL_SHUTDOWN_TIMEOUT_MS) {
                    tokio::time::sleep(KILL_POLL_INTERVAL).await;
                    match child.try_wait() {
                        Ok(Some(_)) => {
                            info!(pid = %pid, "Backend exited gracefully after SIGTERM");
                            return Ok(());
                        }
                        Ok(None) => continue,
                        Err(e) => return Err(e),
                    }
                }

                warn!(pid = %pid, "Backend did not exit after SIGTERM, sending SIGKILL");
            }
        }

        // SIGKILL (TerminateProcess on Windows) and reap
        child.kill().await
    }
}

#[async_trait]
impl ProcessInvoker for SubprocessInvoker {
    async fn invoke(&self, invocation: Invocation) -> Result<ProcessOutcome, InvokeError> {
        let started = Instant::now();

        info!(
            program = %invocation.program(),
            args = ?invocation.args(),
            working_dir = %self.config.working_dir.display(),
            timeout_ms = ?self.config.timeout.map(|t| t.as_millis()),
            "Starting backend process"
        );

        let mut child = self.build_command(&invocation).spawn().map_err(|e| {
            InvokeError::SpawnFailed(format!("{}: {}", invocation.program(), e))
        })?;

        let collected = match self.config.timeout {
            Some(limit) => timeout(limit, self.collect(&mut child)).await.ok(),
            None => Some(self.collect(&mut child).await),
        };

        let (output, exit_code) = match collected {
            Some(Ok(collected)) => collected,
            Some(Err(e)) => {
                let _ = child.start_kill();
                return Err(e);
            }
            None => {
                let timeout_ms = self.config.timeout.map_or(0, |t| t.as_millis() as u64);
                warn!(
                    program = %invocation.program(),
                    timeout_ms,
                    "Backend exceeded its deadline"
                );
                if let Err(e) = self.kill_graceful(&mut child).await {
                    // kill_on_drop still reaps it when `child` goes out of scope
                    warn!(error = %e, "Failed to terminate timed-out backend");
                }
                return Err(InvokeError::Timeout(timeout_ms));
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;

        info!(
            program = %invocation.program(),
            operation = %invocation.operation(),
            duration_ms,
            exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Backend process completed"
        );

        Ok(ProcessOutcome::new(exit_code, output.stdout, output.stderr).with_duration(duration_ms))
    }
}
