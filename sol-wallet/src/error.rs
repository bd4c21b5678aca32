//! Wallet error types

use sol_crypto::CryptoError;
use sol_hsm::HsmError;
use sol_store::StoreError;
use thiserror::Error;

/// Result type for wallet operations
pub type WalletResult<T> = std::result::Result<T, WalletError>;

#[derive(Debug, Error)]
pub enum WalletError {
    /// Authentication tag mismatch while unlocking
    #[error("wrong password")]
    WrongPassword,

    /// Nothing has been created or restored yet
    #[error("no wallet record found")]
    NoRecord,

    /// Seed access attempted while the vault is locked
    #[error("wallet is locked")]
    Locked,

    #[error("invalid seed record: {0}")]
    InvalidRecord(String),

    /// A memo on a transfer that resolves to a plain SOL transfer
    #[error("Memo not implemented")]
    MemoNotImplemented,

    #[error("account index {0} is out of range")]
    AccountOutOfRange(usize),

    /// The hardware slot is selected but no device is attached to the session
    #[error("hardware account selected but no device connected")]
    HardwareNotConnected,

    #[error("cluster error: {0}")]
    Cluster(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Hsm(#[from] HsmError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WalletError {
    pub fn cluster(message: impl Into<String>) -> Self {
        WalletError::Cluster(message.into())
    }
}
