//! RPC Method Handlers

use crate::error::{into_rpc_result, throttled};
use crate::rate_limiter::RateLimiter;
use crate::types::{RunSimulationRequest, StatsResponse};
use iac_bridge_core::BridgeService;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    bridge: Arc<BridgeService>,
    rate_limiter: RateLimiter,
}

impl RpcHandler {
    pub fn new(bridge: Arc<BridgeService>, rate_limiter: RateLimiter) -> Self {
        Self {
            bridge,
            rate_limiter,
        }
    }

    /// network.info.v1
    pub async fn network_info(&self) -> Result<serde_json::Value, ErrorObjectOwned> {
        if !self.rate_limiter.check() {
            return Err(throttled());
        }

        into_rpc_result(self.bridge.fetch_info().await)
    }

    /// simulation.run.v1
    pub async fn run_simulation(
        &self,
        params: RunSimulationRequest,
    ) -> Result<serde_json::Value, ErrorObjectOwned> {
        if !self.rate_limiter.check() {
            return Err(throttled());
        }

        debug!(selected_nodes = %params.selected_nodes, "Forwarding simulation request");

        into_rpc_result(
            self.bridge
                .run_simulation(&params.selected_nodes, &params.params)
                .await,
        )
    }

    /// bridge.stats.v1 (not rate limited, spawns nothing)
    pub async fn stats(&self) -> Result<StatsResponse, ErrorObjectOwned> {
        let stats = self.bridge.stats();
        Ok(StatsResponse {
            max_concurrent_processes: stats.max_concurrent_processes,
            running_processes: stats.running_processes,
            uptime_seconds: stats.uptime_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use iac_bridge_core::domain::BackendSpec;
    use iac_bridge_core::port::process_invoker::mocks::MockProcessInvoker;
    use serde_json::json;

    fn handler(invoker: MockProcessInvoker, burst: u32) -> RpcHandler {
        let backend = BackendSpec::new("python3", vec!["iac_bridge.py".to_string()]).unwrap();
        let bridge = BridgeService::new(backend, Arc::new(invoker), 2).unwrap();
        RpcHandler::new(Arc::new(bridge), RateLimiter::new(burst, 1))
    }

    #[tokio::test]
    async fn test_network_info_returns_payload() {
        let handler = handler(MockProcessInvoker::new_success(r#"{"nodes":["Art"]}"#), 10);

        let result = handler.network_info().await.unwrap();

        assert_eq!(result, json!({"nodes": ["Art"]}));
    }

    #[tokio::test]
    async fn test_run_simulation_forwards_params_unmodified() {
        let handler = handler(MockProcessInvoker::new_echo(), 10);

        let result = handler
            .run_simulation(RunSimulationRequest {
                selected_nodes: json!(["Art", "Jets"]),
                params: json!({"excitatory": 0.1, "steps": 3}),
            })
            .await
            .unwrap();

        assert_eq!(
            result,
            json!([
                "iac_bridge.py",
                "run",
                r#"["Art","Jets"]"#,
                r#"{"excitatory":0.1,"steps":3}"#
            ])
        );
    }

    #[tokio::test]
    async fn test_backend_failure_is_rpc_error() {
        let handler = handler(MockProcessInvoker::new_exit(1, "", "KeyError: 'steps'\n"), 10);

        let err = handler
            .run_simulation(RunSimulationRequest {
                selected_nodes: json!([]),
                params: json!({}),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), code::BACKEND_FAILED);
        assert_eq!(err.message(), "KeyError: 'steps'\n");
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let handler = handler(MockProcessInvoker::new_success("{}"), 1);

        assert!(handler.network_info().await.is_ok());
        let err = handler.network_info().await.unwrap_err();

        assert_eq!(err.code(), code::THROTTLED);
    }

    #[tokio::test]
    async fn test_stats_reports_capacity() {
        let handler = handler(MockProcessInvoker::new_success("{}"), 1);

        let stats = handler.stats().await.unwrap();

        assert_eq!(stats.max_concurrent_processes, 2);
        assert_eq!(stats.running_processes, 0);
    }
}
