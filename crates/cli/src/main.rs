//! IAC CLI - Command-line client for the IAC bridge daemon

mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::Table;

use crate::view::{final_activations, pool_rows, NetworkInfo, SimulationRun};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:3000";

#[derive(Parser)]
#[command(name = "iac")]
#[command(about = "Interactive Activation and Competition network client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "IAC_BRIDGE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the network structure (pools and units)
    Info {
        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Run a simulation with external input on the given units
    Run {
        /// Unit receiving external input (repeatable)
        #[arg(short, long = "node", required = true)]
        nodes: Vec<String>,

        /// Excitatory weight between connected units
        #[arg(long, default_value = "0.1", allow_hyphen_values = true)]
        excitatory: f64,

        /// Inhibitory weight inside a pool
        #[arg(long, default_value = "-0.2", allow_hyphen_values = true)]
        inhibitory: f64,

        /// Activation decay per step
        #[arg(long, default_value = "0.05")]
        decay: f64,

        /// Number of update cycles
        #[arg(long, default_value = "100")]
        steps: u32,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Show bridge capacity
    Status,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        match error.data {
            Some(data) => anyhow::bail!("RPC error ({}): {}\n{}", error.code, error.message, data),
            None => anyhow::bail!("RPC error ({}): {}", error.code, error.message),
        }
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { json } => {
            let result = call_rpc(&cli.rpc_url, "network.info.v1", json!([])).await?;
            if json {
                return print_json(&result);
            }

            let info: NetworkInfo =
                serde_json::from_value(result).context("Unexpected network info payload")?;

            println!("{}", "Network".cyan().bold());
            println!(
                "  {} {}   {} {}",
                "Units:".bold(),
                info.nodes.len(),
                "Connections:".bold(),
                info.connections.len()
            );
            println!();
            println!("{}", Table::new(pool_rows(&info)));
        }

        Commands::Run {
            nodes,
            excitatory,
            inhibitory,
            decay,
            steps,
            json,
        } => {
            let params = json!({
                "selectedNodes": nodes,
                "params": {
                    "excitatory": excitatory,
                    "inhibitory": inhibitory,
                    "decay": decay,
                    "steps": steps,
                },
            });

            let result = call_rpc(&cli.rpc_url, "simulation.run.v1", params).await?;
            if json {
                return print_json(&result);
            }

            let run: SimulationRun =
                serde_json::from_value(result).context("Unexpected simulation payload")?;

            println!(
                "{}",
                format!("✓ Simulation finished ({} steps)", run.history.len())
                    .green()
                    .bold()
            );
            println!();
            println!("{}", Table::new(final_activations(&run, &nodes)));
        }

        Commands::Status => {
            println!("{}", "Bridge Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "bridge.stats.v1", json!([])).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!(
                        "  {} {}/{}",
                        "Running backends:".bold(),
                        stats["running_processes"],
                        stats["max_concurrent_processes"]
                    );
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
