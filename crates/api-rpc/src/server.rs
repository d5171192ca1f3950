//! JSON-RPC Server
//!
//! Serves the bridge over JSON-RPC 2.0 on HTTP, bound to localhost.

use crate::error::{invalid_params, ServerError};
use crate::handler::RpcHandler;
use crate::rate_limiter::RateLimiter;
use crate::types::{method, RunSimulationRequest};
use iac_bridge_core::BridgeService;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 3000;
const DEFAULT_RATE_LIMIT_BURST: u32 = 200;
const DEFAULT_RATE_LIMIT_PER_SEC: u32 = 100;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// `0` picks a free port (see `RpcServer::start`'s returned address)
    pub port: u16,
    pub rate_limit_burst: u32,
    pub rate_limit_per_sec: u32,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
            rate_limit_per_sec: DEFAULT_RATE_LIMIT_PER_SEC,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, bridge: Arc<BridgeService>) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit_burst, config.rate_limit_per_sec);
        Self {
            config,
            handler: Arc::new(RpcHandler::new(bridge, rate_limiter)),
        }
    }

    /// Start the JSON-RPC server and return its handle plus the bound address
    pub async fn start(self) -> Result<(ServerHandle, SocketAddr), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;
        let local_addr = server.local_addr().map_err(|e| ServerError::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method(method::NETWORK_INFO, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.network_info().await }
            })
            .map_err(|e| ServerError::Register {
                method: method::NETWORK_INFO,
                reason: e.to_string(),
            })?;

        let handler = self.handler.clone();
        module
            .register_async_method(method::SIMULATION_RUN, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RunSimulationRequest = params.parse().map_err(invalid_params)?;
                    handler.run_simulation(req).await
                }
            })
            .map_err(|e| ServerError::Register {
                method: method::SIMULATION_RUN,
                reason: e.to_string(),
            })?;

        let handler = self.handler.clone();
        module
            .register_async_method(method::BRIDGE_STATS, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.stats().await }
            })
            .map_err(|e| ServerError::Register {
                method: method::BRIDGE_STATS,
                reason: e.to_string(),
            })?;

        info!(
            address = %local_addr,
            rate_limit_burst = self.config.rate_limit_burst,
            rate_limit_per_sec = self.config.rate_limit_per_sec,
            "JSON-RPC server started"
        );

        let handle = server.start(module);
        Ok((handle, local_addr))
    }
}
