//! Wallet configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sol_crypto::scrypt::ScryptParams;
use sol_hsm::HsmConfig;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_CLUSTER_URL: &str = "https://api.mainnet-beta.solana.com";

/// Complete wallet configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub storage: StorageConfig,
    pub keystore: KeystoreConfig,
    pub device: DeviceConfig,
    pub cluster: ClusterConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Nothing survives the process; for tests and dry runs
    Memory,
    #[default]
    Sled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_data_dir().join("wallet.db"),
        }
    }
}

/// scrypt cost for newly created seed records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystoreConfig {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        let ScryptParams { log_n, r, p } = ScryptParams::DEFAULT;
        Self { log_n, r, p }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub interaction_timeout_secs: u64,
    pub device_index: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            interaction_timeout_secs: sol_hsm::config::INTERACTION_TIMEOUT.as_secs(),
            device_index: 0,
        }
    }
}

/// Endpoint of the external broadcaster. The wallet signs offline and never
/// opens this URL itself; the CLI only names it when handing over a signed
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub url: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CLUSTER_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// `~/.local/share/sol-wallet` or the platform equivalent.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sol-wallet")
}

impl WalletConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sol-wallet")
            .join("config.toml")
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: WalletConfig = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Like [`WalletConfig::load`], falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.device.interaction_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "device.interaction_timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.to_scrypt_params()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("keystore: {e}")))?;
        if self.cluster.url.trim().is_empty() {
            return Err(ConfigError::Invalid("cluster.url must not be empty".to_string()));
        }
        if self.storage.backend == StorageBackend::Sled && self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.path is required for the sled backend".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_scrypt_params(&self) -> ScryptParams {
        ScryptParams {
            log_n: self.keystore.log_n,
            r: self.keystore.r,
            p: self.keystore.p,
        }
    }

    pub fn interaction_timeout(&self) -> Duration {
        Duration::from_secs(self.device.interaction_timeout_secs)
    }

    pub fn to_hsm_config(&self) -> HsmConfig {
        HsmConfig {
            interaction_timeout: self.interaction_timeout(),
            device_index: self.device.device_index,
            ..HsmConfig::default()
        }
    }
}
