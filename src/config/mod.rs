//! Configuration for the Hetu CLI.
//!
//! Settings are merged from three layers, lowest precedence first:
//!
//! 1. hardcoded defaults ([`Config::default`])
//! 2. the YAML file at `~/.hetucli/config.yml` (or `--config`)
//! 3. non-empty command line overrides ([`CliOverrides`])
//!
//! No validation of addresses or URLs happens here; malformed values surface
//! later as RPC or contract errors.

use crate::core::constants;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or seeding the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("No {0} found in config or CLI.")]
    Missing(&'static str),
}

/// Contract deployments addressed through config keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKey {
    Subnet,
    Amm,
    Staking,
    Dendron,
    Weights,
    Whetu,
}

impl ContractKey {
    /// Name of the config key holding this contract's address
    pub fn config_key(&self) -> &'static str {
        match self {
            ContractKey::Subnet => "subnet_address",
            ContractKey::Amm => "amm_address",
            ContractKey::Staking => "staking_address",
            ContractKey::Dendron => "dendron_address",
            ContractKey::Weights => "weights_address",
            ContractKey::Whetu => "whetu_address",
        }
    }
}

/// Resolved client configuration, passed explicitly to every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chain: String,
    pub json_rpc: String,
    pub network: String,
    pub no_cache: bool,
    pub wallet_hotkey: String,
    pub wallet_name: String,
    pub wallet_path: String,
    pub whetu_address: String,
    pub subnet_address: String,
    pub staking_address: String,
    pub amm_address: String,
    pub dendron_address: String,
    pub weights_address: String,
    pub metagraph_cols: BTreeMap<String, bool>,
    /// Seconds to wait for a transaction receipt
    pub receipt_timeout: u64,
    /// Milliseconds between receipt polls
    pub receipt_poll_interval: u64,
    /// Overrides the bundled ABI directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi_dir: Option<String>,
    /// Keys this client does not interpret, kept so they survive a round trip
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: constants::DEFAULT_CHAIN_ENDPOINT.to_string(),
            json_rpc: constants::DEFAULT_JSON_RPC.to_string(),
            network: constants::DEFAULT_NETWORK.to_string(),
            no_cache: false,
            wallet_hotkey: constants::DEFAULT_WALLET_HOTKEY.to_string(),
            wallet_name: constants::DEFAULT_WALLET_NAME.to_string(),
            wallet_path: constants::DEFAULT_WALLET_PATH.to_string(),
            whetu_address: constants::DEFAULT_WHETU_ADDRESS.to_string(),
            subnet_address: constants::DEFAULT_SUBNET_ADDRESS.to_string(),
            staking_address: constants::DEFAULT_STAKING_ADDRESS.to_string(),
            amm_address: constants::DEFAULT_AMM_ADDRESS.to_string(),
            dendron_address: constants::DEFAULT_DENDRON_ADDRESS.to_string(),
            weights_address: constants::DEFAULT_WEIGHTS_ADDRESS.to_string(),
            metagraph_cols: constants::DEFAULT_METAGRAPH_COLS
                .iter()
                .map(|col| (col.to_string(), true))
                .collect(),
            receipt_timeout: constants::DEFAULT_RECEIPT_TIMEOUT_SECS,
            receipt_poll_interval: constants::DEFAULT_RECEIPT_POLL_INTERVAL_MS,
            abi_dir: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Values supplied on the command line. `None` and empty strings leave the
/// lower layers untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub chain: Option<String>,
    pub json_rpc: Option<String>,
    pub network: Option<String>,
    pub no_cache: Option<bool>,
    pub wallet_hotkey: Option<String>,
    pub wallet_name: Option<String>,
    pub wallet_path: Option<String>,
}

impl Config {
    /// Load the configuration, seeding the file with defaults on first run.
    pub fn load(explicit_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let path = explicit_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);
        ensure_config_file(&path)?;

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Defaults updated with the contents of `path`. A missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse YAML on top of the defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply non-empty command line values on top of the current settings.
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        override_string(&mut self.chain, &overrides.chain);
        override_string(&mut self.json_rpc, &overrides.json_rpc);
        override_string(&mut self.network, &overrides.network);
        override_string(&mut self.wallet_hotkey, &overrides.wallet_hotkey);
        override_string(&mut self.wallet_name, &overrides.wallet_name);
        override_string(&mut self.wallet_path, &overrides.wallet_path);
        if let Some(no_cache) = overrides.no_cache {
            self.no_cache = no_cache;
        }
    }

    /// JSON-RPC endpoint, failing when unset.
    pub fn rpc_url(&self) -> Result<&str, ConfigError> {
        non_empty(&self.json_rpc).ok_or(ConfigError::Missing("RPC URL"))
    }

    /// Configured address string for a contract, failing when unset.
    pub fn contract_address(&self, key: ContractKey) -> Result<&str, ConfigError> {
        let value = match key {
            ContractKey::Subnet => &self.subnet_address,
            ContractKey::Amm => &self.amm_address,
            ContractKey::Staking => &self.staking_address,
            ContractKey::Dendron => &self.dendron_address,
            ContractKey::Weights => &self.weights_address,
            ContractKey::Whetu => &self.whetu_address,
        };
        non_empty(value).ok_or(ConfigError::Missing(key.config_key()))
    }

    /// Wallet directory with `~` expanded.
    pub fn wallet_dir(&self) -> PathBuf {
        expand_home(&self.wallet_path)
    }

    /// Directory holding the contract ABI files.
    pub fn abi_dir(&self) -> PathBuf {
        match self.abi_dir.as_deref().and_then(non_empty) {
            Some(dir) => expand_home(dir),
            None => bundled_abi_dir(),
        }
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval.max(1))
    }
}

/// Write the default configuration to `path` when no file exists there.
///
/// Returns `true` when a new file was created.
pub fn ensure_config_file(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let contents = Config::default().to_yaml_string()?;
    fs::write(path, contents).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Wrote default config file");
    Ok(true)
}

/// `~/.hetucli/config.yml`
pub fn default_config_path() -> PathBuf {
    expand_home(constants::DEFAULT_CONFIG_PATH)
}

/// ABI directory shipped with the source tree
pub fn bundled_abi_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/contracts"))
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn override_string(target: &mut String, value: &Option<String>) {
    if let Some(v) = value.as_deref().and_then(non_empty) {
        *target = v.to_string();
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
