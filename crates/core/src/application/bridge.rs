// Bridge Service - the only seam a router talks to

use crate::application::{AdmissionControl, CommandBuilder, ResultDecoder};
use crate::domain::{BackendSpec, BridgeResult, Command};
use crate::error::Result;
use crate::port::ProcessInvoker;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Snapshot of bridge capacity (for admin endpoints)
#[derive(Debug, Clone, Serialize)]
pub struct BridgeStats {
    pub max_concurrent_processes: usize,
    pub running_processes: usize,
    pub uptime_seconds: u64,
}

/// Bridge facade: builds the command, waits for admission, invokes the
/// backend and decodes its output. Every failure comes back as a
/// `BridgeResult` variant, never as an `Err`.
pub struct BridgeService {
    backend: BackendSpec,
    invoker: Arc<dyn ProcessInvoker>,
    admission: AdmissionControl,
    started_at: Instant,
}

impl BridgeService {
    /// # Errors
    /// - AppError::Config if `max_concurrent_processes` is zero
    pub fn new(
        backend: BackendSpec,
        invoker: Arc<dyn ProcessInvoker>,
        max_concurrent_processes: usize,
    ) -> Result<Self> {
        Ok(Self {
            backend,
            invoker,
            admission: AdmissionControl::new(max_concurrent_processes)?,
            started_at: Instant::now(),
        })
    }

    /// Network structure (`<backend> info`)
    pub async fn fetch_info(&self) -> BridgeResult {
        self.execute(CommandBuilder::info()).await
    }

    /// Run a simulation (`<backend> run <selected_nodes> <params>`).
    /// Both values are forwarded to the backend unmodified.
    pub async fn run_simulation(&self, selected_nodes: &Value, params: &Value) -> BridgeResult {
        self.execute(CommandBuilder::run(selected_nodes, params)).await
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            max_concurrent_processes: self.admission.limit(),
            running_processes: self.admission.in_flight(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }

    async fn execute(&self, command: Command) -> BridgeResult {
        let operation = command.operation();
        let invocation = self.backend.invocation(command);

        let _permit = match self.admission.admit().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(operation = %operation, error = %e, "Admission failed");
                return BridgeResult::SpawnError {
                    message: e.to_string(),
                };
            }
        };

        let result = match self.invoker.invoke(invocation).await {
            Ok(outcome) => ResultDecoder::decode(&outcome),
            Err(e) => ResultDecoder::from_invoke_error(e),
        };

        info!(
            operation = %operation,
            result = result.kind(),
            "Bridge request finished"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::process_invoker::mocks::{MockBehavior, MockProcessInvoker};
    use crate::port::InvokeError;
    use serde_json::json;
    use std::time::Duration;

    fn backend() -> BackendSpec {
        BackendSpec::new("python3", vec!["iac_bridge.py".to_string()]).unwrap()
    }

    fn service(invoker: Arc<MockProcessInvoker>, limit: usize) -> BridgeService {
        BridgeService::new(backend(), invoker, limit).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_info_invocation() {
        let invoker = Arc::new(MockProcessInvoker::new_success(r#"{"nodes":[]}"#));
        let bridge = service(invoker.clone(), 1);

        let result = bridge.fetch_info().await;

        assert_eq!(
            result,
            BridgeResult::Success {
                payload: json!({"nodes": []})
            }
        );
        let calls = invoker.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program(), "python3");
        assert_eq!(calls[0].args(), ["iac_bridge.py", "info"]);
    }

    #[tokio::test]
    async fn test_run_simulation_argv() {
        let invoker = Arc::new(MockProcessInvoker::new_echo());
        let bridge = service(invoker, 1);

        let result = bridge
            .run_simulation(&json!({"nodes": ["A", "B"]}), &json!({"iterations": 5}))
            .await;

        assert_eq!(
            result.payload(),
            Some(&json!([
                "iac_bridge.py",
                "run",
                r#"{"nodes":["A","B"]}"#,
                r#"{"iterations":5}"#
            ]))
        );
    }

    #[tokio::test]
    async fn test_execution_failure_is_a_result() {
        let invoker = Arc::new(MockProcessInvoker::new_exit(1, "{}", "boom"));
        let bridge = service(invoker, 1);

        assert_eq!(
            bridge.fetch_info().await,
            BridgeResult::ExecutionError {
                message: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_is_a_result() {
        let invoker = Arc::new(MockProcessInvoker::new_fail(InvokeError::SpawnFailed(
            "No such file or directory".to_string(),
        )));
        let bridge = service(invoker, 1);

        assert!(matches!(
            bridge.fetch_info().await,
            BridgeResult::SpawnError { .. }
        ));
    }

    #[tokio::test]
    async fn test_behavior_change_between_calls() {
        let invoker = Arc::new(MockProcessInvoker::new_success("{}"));
        let bridge = service(invoker.clone(), 1);
        assert!(bridge.fetch_info().await.is_success());

        invoker.set_behavior(MockBehavior::Exit {
            code: 0,
            stdout: b"not json".to_vec(),
            stderr: vec![],
        });

        assert_eq!(
            bridge.fetch_info().await,
            BridgeResult::DecodeError {
                raw_output: "not json".to_string()
            }
        );
        assert_eq!(invoker.call_count(), 2);
    }

    #[tokio::test]
    async fn test_admission_caps_concurrency() {
        let invoker = Arc::new(
            MockProcessInvoker::new_success("{}").with_delay(Duration::from_millis(30)),
        );
        let bridge = Arc::new(service(invoker.clone(), 2));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let bridge = bridge.clone();
            handles.push(tokio::spawn(async move { bridge.fetch_info().await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_success());
        }

        assert_eq!(invoker.call_count(), 6);
        assert!(invoker.peak_concurrency() <= 2);
        assert_eq!(bridge.stats().running_processes, 0);
    }

    #[tokio::test]
    async fn test_repeated_info_is_structurally_equal() {
        let invoker = Arc::new(MockProcessInvoker::new_success(
            r#"{"columns":["Name","Gang"],"nodes":["Art","Jets"]}"#,
        ));
        let bridge = service(invoker, 1);

        let first = bridge.fetch_info().await;
        let second = bridge.fetch_info().await;

        assert!(first.is_success());
        assert_eq!(first, second);
    }
}
