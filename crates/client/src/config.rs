use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::{Address, errors::ClientError};

use crate::watcher::WatcherSettings;

pub const RPC_URL_ENV: &str = "FUNDME_RPC_URL";
pub const CONTRACT_ADDRESS_ENV: &str = "FUNDME_CONTRACT_ADDRESS";
pub const PRIVATE_KEY_ENV: &str = "FUNDME_PRIVATE_KEY";

const DEFAULT_REQUIRED_CONFIRMATIONS: u64 = 1;
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 300;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_MAX_POLL_ERRORS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the wallet provider. `None` means no provider.
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default = "default_required_confirmations")]
    pub required_confirmations: u64,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_errors")]
    pub max_poll_errors: u32,
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
    // Only ever read from the environment.
    #[serde(skip)]
    pub private_key: Option<String>,
    #[serde(skip)]
    pub config_file_path: PathBuf,
}

const fn default_required_confirmations() -> u64 {
    DEFAULT_REQUIRED_CONFIRMATIONS
}

const fn default_confirmation_timeout_secs() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

const fn default_max_poll_errors() -> u32 {
    DEFAULT_MAX_POLL_ERRORS
}

impl ClientConfig {
    pub fn get_config_file_path(file_path_option: Option<String>) -> Result<PathBuf, ClientError> {
        if let Some(file_path_str) = file_path_option {
            let mut path = PathBuf::from(file_path_str);
            if path.is_dir() {
                path.push("config.yaml");
            }
            debug!("Using config file path: {}", path.display());
            Ok(path)
        } else {
            let proj_dirs = ProjectDirs::from("", "", "FundMe").ok_or_else(|| {
                ClientError::Config("Failed to determine project directory".into())
            })?;
            Ok(proj_dirs.config_dir().join("config.yaml"))
        }
    }

    /// Reads the config file if there is one, then applies environment
    /// overrides (a `.env` file is honoured).
    pub fn load(config_file_path: Option<String>) -> Result<Self, ClientError> {
        let path = Self::get_config_file_path(config_file_path)?;

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            ClientConfigBuilder::new().build()
        };
        config.config_file_path = path;
        config.apply_overrides(|key| dotenvy::var(key).ok());

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("Failed to read config file: {e}")))?;

        let mut config = serde_yaml::from_str::<Self>(&contents)
            .map_err(|e| ClientError::Config(format!("Failed to deserialize config file: {e}")))?;
        config.config_file_path = path.to_path_buf();

        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rpc_url) = lookup(RPC_URL_ENV) {
            self.rpc_url = Some(rpc_url);
        }
        if let Some(address) = lookup(CONTRACT_ADDRESS_ENV) {
            self.contract_address = Some(address);
        }
        if let Some(key) = lookup(PRIVATE_KEY_ENV) {
            self.private_key = Some(key);
        }
    }

    pub fn save_to_file(&self) -> Result<(), ClientError> {
        if let Some(parent) = self.config_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ClientError::Config(format!("Failed to create config directory: {e}"))
                })?;
            }
        }

        let config_str = serde_yaml::to_string(self)
            .map_err(|e| ClientError::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(&self.config_file_path, config_str)
            .map_err(|e| ClientError::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    pub fn contract_address(&self) -> Result<Address, ClientError> {
        let raw = self
            .contract_address
            .as_deref()
            .ok_or_else(|| ClientError::Config("No contract address configured".to_string()))?;

        Address::from_str(raw.trim())
            .map_err(|e| ClientError::Config(format!("Invalid contract address {raw}: {e}")))
    }

    #[must_use]
    pub const fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    #[must_use]
    pub const fn watcher_settings(&self) -> WatcherSettings {
        WatcherSettings {
            required_confirmations: self.required_confirmations,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_poll_errors: self.max_poll_errors,
        }
    }
}

pub struct ClientConfigBuilder {
    config_file_path: Option<PathBuf>,
    rpc_url: Option<String>,
    contract_address: Option<String>,
    private_key: Option<String>,
    required_confirmations: Option<u64>,
    confirmation_timeout_secs: Option<u64>,
    poll_interval_ms: Option<u64>,
    max_poll_errors: Option<u32>,
    log_file_path: Option<PathBuf>,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfigBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config_file_path: None,
            rpc_url: None,
            contract_address: None,
            private_key: None,
            required_confirmations: None,
            confirmation_timeout_secs: None,
            poll_interval_ms: None,
            max_poll_errors: None,
            log_file_path: None,
        }
    }

    #[must_use]
    pub fn config_file_path(mut self, path: PathBuf) -> Self {
        self.config_file_path = Some(path);
        self
    }

    #[must_use]
    pub fn rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = Some(rpc_url.into());
        self
    }

    #[must_use]
    pub fn contract_address(mut self, address: impl Into<String>) -> Self {
        self.contract_address = Some(address.into());
        self
    }

    #[must_use]
    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    #[must_use]
    pub const fn required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = Some(confirmations);
        self
    }

    #[must_use]
    pub const fn confirmation_timeout_secs(mut self, secs: u64) -> Self {
        self.confirmation_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub const fn poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = Some(millis);
        self
    }

    #[must_use]
    pub const fn max_poll_errors(mut self, errors: u32) -> Self {
        self.max_poll_errors = Some(errors);
        self
    }

    #[must_use]
    pub fn log_file_path(mut self, path: PathBuf) -> Self {
        self.log_file_path = Some(path);
        self
    }

    #[must_use]
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            rpc_url: self.rpc_url,
            contract_address: self.contract_address,
            required_confirmations: self
                .required_confirmations
                .unwrap_or(DEFAULT_REQUIRED_CONFIRMATIONS),
            confirmation_timeout_secs: self
                .confirmation_timeout_secs
                .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            max_poll_errors: self.max_poll_errors.unwrap_or(DEFAULT_MAX_POLL_ERRORS),
            log_file_path: self.log_file_path,
            private_key: self.private_key,
            config_file_path: self.config_file_path.unwrap_or_default(),
        }
    }
}
