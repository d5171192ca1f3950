//! RPC Request/Response Types

use serde::{Deserialize, Serialize};

/// Method names (versioned so the contract can evolve side by side)
pub mod method {
    pub const NETWORK_INFO: &str = "network.info.v1";
    pub const SIMULATION_RUN: &str = "simulation.run.v1";
    pub const BRIDGE_STATS: &str = "bridge.stats.v1";
}

/// simulation.run.v1 - Run a simulation.
/// Both fields are forwarded to the backend exactly as received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSimulationRequest {
    #[serde(rename = "selectedNodes")]
    pub selected_nodes: serde_json::Value,
    pub params: serde_json::Value,
}

/// bridge.stats.v1 - Bridge capacity snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub max_concurrent_processes: usize,
    pub running_processes: usize,
    pub uptime_seconds: u64,
}
