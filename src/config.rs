//! Configuration module
//!
//! This module handles all configuration loading from TOML files,
//! environment variables, and provides structured configuration types.
//! Private key material is never part of the file: the config only names
//! the environment variable that may hold it.

use crate::resolver::ResolverConfig;
use crate::rpc::RetryPolicy;
use crate::types::{NetworkId, SuiAddress};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network selection
    #[serde(default)]
    pub network: NetworkConfig,

    /// Fullnode client configuration
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Resolution timing
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Wallet configuration
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Gas defaults
    #[serde(default)]
    pub gas: GasConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Target network
    #[serde(default = "default_network")]
    pub name: NetworkId,

    /// Override the network's default fullnode URL
    #[serde(default)]
    pub fullnode_url: Option<String>,
}

impl NetworkConfig {
    /// The fullnode endpoint to use: the override, or the network default.
    pub fn effective_fullnode_url(&self) -> String {
        self.fullnode_url
            .clone()
            .unwrap_or_else(|| self.name.fullnode_url().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,

    /// Max retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.max(1),
            ..RetryPolicy::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Wait before the first effects fetch (eventual visibility)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound on a single effects fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl ResolverSettings {
    pub fn to_resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Address the imported key is expected to derive to (optional check)
    #[serde(default)]
    pub expected_address: Option<SuiAddress>,

    /// Name of the environment variable holding the private key import
    /// string. The key itself never goes in this file.
    #[serde(default = "default_key_env")]
    pub key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
    /// Gas budget applied when a command does not specify one
    #[serde(default = "default_gas_budget")]
    pub default_budget: u64,
}

// Default value functions
fn default_network() -> NetworkId {
    NetworkId::Testnet
}
fn default_rpc_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    2000
}
fn default_fetch_timeout_secs() -> u64 {
    15
}
fn default_key_env() -> String {
    "SUIFORGE_PRIVATE_KEY".to_string()
}
fn default_gas_budget() -> u64 {
    10_000_000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network(),
            fullnode_url: None,
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_rpc_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            expected_address: None,
            key_env: default_key_env(),
        }
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            default_budget: default_gas_budget(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            rpc: RpcConfig::default(),
            resolver: ResolverSettings::default(),
            wallet: WalletConfig::default(),
            gas: GasConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.network.name, NetworkId::Testnet);
        assert!(config
            .network
            .effective_fullnode_url()
            .contains("testnet"));
        assert_eq!(config.resolver.initial_delay_ms, 2000);
        assert_eq!(config.gas.default_budget, 10_000_000);
        assert_eq!(config.wallet.key_env, "SUIFORGE_PRIVATE_KEY");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let toml_src = r#"
            [network]
            name = "devnet"

            [resolver]
            initial_delay_ms = 500
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.network.name, NetworkId::Devnet);
        assert_eq!(config.resolver.initial_delay_ms, 500);
        // Untouched sections keep defaults
        assert_eq!(config.rpc.max_retries, 3);
        assert_eq!(config.resolver.fetch_timeout_secs, 15);
    }

    #[test]
    fn test_fullnode_override_wins() {
        let toml_src = r#"
            [network]
            name = "testnet"
            fullnode_url = "http://localhost:9000"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.network.effective_fullnode_url(), "http://localhost:9000");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gas]\ndefault_budget = 42").unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.gas.default_budget, 42);

        assert!(Config::from_file("/nonexistent/config.toml").is_err());
    }

    #[test]
    fn test_retry_policy_respects_max_retries() {
        let rpc = RpcConfig {
            timeout_secs: 5,
            max_retries: 0,
        };
        // Clamped to at least one attempt
        assert_eq!(rpc.retry_policy().max_attempts, 1);
    }
}
