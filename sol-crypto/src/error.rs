//! Crypto error types

use thiserror::Error;

/// Result type for crypto operations
pub type CryptoResult<T> = std::result::Result<T, CryptoError>;

/// Errors raised while deriving, encoding or sealing key material.
///
/// Derivation variants indicate a programming error at the call site: the
/// operation is aborted and no partial key is ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Derivation path has no segments
    #[error("derivation path is empty")]
    EmptyPath,

    /// Derivation path does not fit its one-byte length prefix
    #[error("derivation path has {0} segments, at most 255 are allowed")]
    PathTooLong(usize),

    /// Path string could not be parsed
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    /// ed25519 derivation only supports hardened children
    #[error("segment {index} of the derivation path is not hardened")]
    NonHardenedSegment { index: u32 },

    /// Root seed length outside the 16..=64 byte range
    #[error("invalid seed length: {0} bytes")]
    InvalidSeedLength(usize),

    /// Key bytes are malformed
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signature bytes are malformed
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Base58 string could not be decoded
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    /// Password key derivation parameters rejected
    #[error("invalid key derivation parameters: {0}")]
    InvalidKdfParams(String),

    /// Ciphertext failed its authentication tag check
    #[error("authentication failed")]
    Authentication,

    /// Sealing failed
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Mnemonic phrase is not a valid BIP-39 phrase
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
}
