//! Configuration for the wallet crates, loaded from TOML.

mod error;
mod wallet;

pub use error::{ConfigError, ConfigResult};
pub use wallet::{
    ClusterConfig, DeviceConfig, KeystoreConfig, LogFormat, LoggingConfig, StorageBackend,
    StorageConfig, WalletConfig, DEFAULT_CLUSTER_URL,
};
