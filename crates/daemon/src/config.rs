//! Daemon configuration
//!
//! Sources, later ones win:
//! 1. built-in defaults
//! 2. optional TOML file (`IAC_BRIDGE_CONFIG`, default `iac-bridge.toml`)
//! 3. environment, e.g. `IAC_BRIDGE_BACKEND__PROGRAM=/usr/bin/python3`,
//!    `IAC_BRIDGE_BACKEND__ARGS=iac_bridge.py`, `IAC_BRIDGE_RPC__PORT=3000`

use anyhow::{ensure, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use iac_bridge_api_rpc::RpcServerConfig;
use iac_bridge_core::application::constants::{
    DEFAULT_ENV_ALLOWLIST, DEFAULT_INVOKE_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_PROCESSES,
};
use iac_bridge_core::domain::BackendSpec;
use iac_bridge_infra_system::InvokerConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PREFIX: &str = "IAC_BRIDGE";
pub const CONFIG_PATH_ENV: &str = "IAC_BRIDGE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "iac-bridge.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub backend: BackendSettings,
    pub rpc: RpcSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: String,
    /// 0 disables the deadline
    pub timeout_ms: u64,
    pub max_concurrent_processes: usize,
    pub env_allowlist: Vec<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["iac_bridge.py".to_string()],
            working_dir: ".".to_string(),
            timeout_ms: DEFAULT_INVOKE_TIMEOUT_MS,
            max_concurrent_processes: DEFAULT_MAX_CONCURRENT_PROCESSES,
            env_allowlist: DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub host: String,
    pub port: u16,
    pub rate_limit_burst: u32,
    pub rate_limit_per_sec: u32,
}

impl Default for RpcSettings {
    fn default() -> Self {
        let defaults = RpcServerConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            rate_limit_burst: defaults.rate_limit_burst,
            rate_limit_per_sec: defaults.rate_limit_per_sec,
        }
    }
}

impl DaemonConfig {
    /// Load from the config file (if present) and the process environment
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = shellexpand::tilde(&path).into_owned();

        let builder = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(env_source());

        Self::from_builder(builder).with_context(|| format!("Failed to load config ({})", path))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.backend.program.trim().is_empty(),
            "backend.program must not be empty"
        );
        ensure!(
            self.backend.max_concurrent_processes >= 1,
            "backend.max_concurrent_processes must be at least 1"
        );
        Ok(())
    }

    pub fn backend_spec(&self) -> Result<BackendSpec> {
        BackendSpec::new(&self.backend.program, self.backend.args.clone())
            .context("Invalid backend specification")
    }

    pub fn invoker_config(&self) -> InvokerConfig {
        InvokerConfig {
            working_dir: PathBuf::from(shellexpand::tilde(&self.backend.working_dir).into_owned()),
            env_allowlist: self.backend.env_allowlist.clone(),
            timeout: (self.backend.timeout_ms > 0)
                .then(|| Duration::from_millis(self.backend.timeout_ms)),
        }
    }

    pub fn rpc_config(&self) -> RpcServerConfig {
        RpcServerConfig {
            host: self.rpc.host.clone(),
            port: self.rpc.port,
            rate_limit_burst: self.rpc.rate_limit_burst,
            rate_limit_per_sec: self.rpc.rate_limit_per_sec,
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("backend.args")
        .with_list_parse_key("backend.env_allowlist")
}
