//! IAC Bridge - Main Entry Point
//! JSON-RPC front end that runs the IAC backend as a child process per request

mod config;
mod logging;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use iac_bridge_api_rpc::RpcServer;
use iac_bridge_core::BridgeService;
use iac_bridge_infra_system::SubprocessInvoker;

use crate::config::DaemonConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let _log_guard = logging::init_logging()?;

    info!("IAC Bridge v{} starting...", VERSION);

    // 2. Load configuration
    let config = DaemonConfig::load()?;
    let backend = config.backend_spec()?;
    let invoker_config = config.invoker_config();

    info!(
        program = %backend.program,
        args = ?backend.base_args,
        working_dir = %invoker_config.working_dir.display(),
        timeout_ms = config.backend.timeout_ms,
        max_concurrent_processes = config.backend.max_concurrent_processes,
        "Backend configured"
    );

    // 3. Setup dependencies (DI wiring)
    let invoker = Arc::new(SubprocessInvoker::new(invoker_config));
    let bridge = Arc::new(
        BridgeService::new(backend, invoker, config.backend.max_concurrent_processes)
            .map_err(|e| anyhow::anyhow!("Bridge setup failed: {}", e))?,
    );

    // 4. Start JSON-RPC server
    let rpc_server = RpcServer::new(config.rpc_config(), bridge);
    let (rpc_handle, addr) = rpc_server.start().await?;

    info!(address = %addr, "IAC Bridge ready");
    info!("Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Graceful shutdown (in-flight children are killed when their requests drop)
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");

    Ok(())
}
