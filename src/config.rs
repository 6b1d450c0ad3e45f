//! Configuration types for the CDP wallet demo
//!
//! Manages the selected network, where the wallet credential is persisted,
//! and how to reach the wallet platform API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default platform API endpoint
pub const DEFAULT_API_URL: &str = "https://api.cdp.coinbase.com/platform";

/// Default location of the exported wallet credential (relative to the working directory)
pub const DEFAULT_CREDENTIAL_PATH: &str = "wallet_data.json";

/// Default location of the API key file (relative to the working directory)
pub const DEFAULT_API_KEY_PATH: &str = "cdp_api_key.json";

/// Global demo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Network every wallet operation runs against
    pub network: NetworkId,

    /// File holding the exported wallet credential
    pub credential_path: String,

    pub platform: PlatformConfig,
}

/// Wallet platform connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub base_url: String,

    /// Path to the API key JSON file (`{"name": ..., "privateKey": ...}`)
    ///
    /// Typically overridden with the CDP_API_KEY_PATH environment variable.
    pub api_key_path: String,

    /// Delay between transfer status polls
    pub poll_interval_ms: u64,

    /// Give up waiting for a transfer after this many seconds
    pub transfer_timeout_secs: u64,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

/// Network identifiers understood by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkId {
    BaseSepolia,
    BaseMainnet,
    EthereumHolesky,
    EthereumMainnet,
    PolygonMainnet,
    ArbitrumMainnet,
}

impl NetworkId {
    /// Wire name used in API paths and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::BaseSepolia => "base-sepolia",
            NetworkId::BaseMainnet => "base-mainnet",
            NetworkId::EthereumHolesky => "ethereum-holesky",
            NetworkId::EthereumMainnet => "ethereum-mainnet",
            NetworkId::PolygonMainnet => "polygon-mainnet",
            NetworkId::ArbitrumMainnet => "arbitrum-mainnet",
        }
    }

    /// Whether this network is a test network
    pub fn is_testnet(&self) -> bool {
        matches!(self, NetworkId::BaseSepolia | NetworkId::EthereumHolesky)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "base-sepolia" => Ok(NetworkId::BaseSepolia),
            "base-mainnet" => Ok(NetworkId::BaseMainnet),
            "ethereum-holesky" => Ok(NetworkId::EthereumHolesky),
            "ethereum-mainnet" => Ok(NetworkId::EthereumMainnet),
            "polygon-mainnet" => Ok(NetworkId::PolygonMainnet),
            "arbitrum-mainnet" => Ok(NetworkId::ArbitrumMainnet),
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key_path: DEFAULT_API_KEY_PATH.to_string(),
            poll_interval_ms: 200,
            transfer_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl GlobalConfig {
    /// Create default configuration for a network
    pub fn for_network(network: NetworkId) -> Self {
        Self {
            network,
            credential_path: DEFAULT_CREDENTIAL_PATH.to_string(),
            platform: PlatformConfig::default(),
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::for_network(NetworkId::BaseSepolia)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Config directory not found")]
    DirectoryNotFound,
}

/// Configuration overrides from environment variables or callers
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub network: Option<NetworkId>,
    pub api_url: Option<String>,
    pub api_key_path: Option<String>,
    pub credential_path: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Create overrides from environment variables
    ///
    /// An unrecognised CDP_NETWORK_ID is ignored with a warning.
    pub fn from_env() -> Self {
        Self {
            network: std::env::var("CDP_NETWORK_ID")
                .ok()
                .and_then(|s| match s.parse::<NetworkId>() {
                    Ok(network) => Some(network),
                    Err(e) => {
                        log::warn!("Ignoring CDP_NETWORK_ID: {}", e);
                        None
                    }
                }),
            api_url: std::env::var("CDP_API_URL").ok(),
            api_key_path: std::env::var("CDP_API_KEY_PATH").ok(),
            credential_path: std::env::var("WALLET_DATA_PATH").ok(),
        }
    }

    /// Merge with another set of overrides (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        if other.network.is_some() {
            self.network = other.network;
        }
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.api_key_path.is_some() {
            self.api_key_path = other.api_key_path;
        }
        if other.credential_path.is_some() {
            self.credential_path = other.credential_path;
        }
        self
    }
}

/// Get the default configuration directory path
///
/// Returns: `~/.cdp-wallet-demo/`
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".cdp-wallet-demo"))
        .ok_or(ConfigError::DirectoryNotFound)
}

/// Get the default configuration file path
///
/// Returns: `~/.cdp-wallet-demo/config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join("config.json"))
}

/// Load configuration from file with overrides
///
/// # Priority (highest to lowest):
/// 1. Caller overrides (passed as argument)
/// 2. Environment variables
/// 3. Config file
/// 4. Defaults (base-sepolia)
///
/// # Example
///
/// ```ignore
/// use cdp_wallet_demo::config::{load_config, ConfigOverrides};
///
/// let config = load_config(None, ConfigOverrides::new())?;
/// ```
pub fn load_config(
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<GlobalConfig, ConfigError> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    let mut config = if path.exists() {
        log::debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents)?
    } else {
        GlobalConfig::default()
    };

    let overrides = ConfigOverrides::from_env().merge(overrides);
    apply_overrides(&mut config, overrides);

    validate(&config)?;

    Ok(config)
}

/// Save configuration to file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &GlobalConfig, config_path: Option<&Path>) -> Result<(), ConfigError> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;

    Ok(())
}

fn apply_overrides(config: &mut GlobalConfig, overrides: ConfigOverrides) {
    if let Some(network) = overrides.network {
        config.network = network;
    }
    if let Some(url) = overrides.api_url {
        config.platform.base_url = url;
    }
    if let Some(path) = overrides.api_key_path {
        config.platform.api_key_path = path;
    }
    if let Some(path) = overrides.credential_path {
        config.credential_path = path;
    }
}

fn validate(config: &GlobalConfig) -> Result<(), ConfigError> {
    if config.credential_path.trim().is_empty() {
        return Err(ConfigError::Invalid("credential_path is empty".to_string()));
    }
    if config.platform.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("platform.base_url is empty".to_string()));
    }
    if config.platform.poll_interval_ms == 0 {
        return Err(ConfigError::Invalid(
            "platform.poll_interval_ms must be positive".to_string(),
        ));
    }
    Ok(())
}
