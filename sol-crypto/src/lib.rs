//! # sol-crypto
//!
//! Cryptographic building blocks for the wallet's key-management subsystem:
//!
//! - [`DerivationPath`]: BIP-44 style paths under `44'/501'`, with the wire
//!   serialization the hardware signing app expects.
//! - [`derive_keypair`]: SLIP-0010 ed25519 hierarchical derivation from a root
//!   seed. Only hardened segments exist for ed25519.
//! - [`Keypair`], [`PublicKey`], [`Signature`]: ed25519 keys, base58 encoded.
//! - [`scrypt`] and [`aead`]: password-based key derivation and AES-256-GCM
//!   sealing used for the encrypted-at-rest seed record.
//! - [`mnemonic`]: BIP-39 phrase generation and phrase-to-seed conversion.

pub mod aead;
pub mod derivation;
pub mod error;
pub mod keys;
pub mod mnemonic;
pub mod scrypt;
pub mod slip10;

pub use derivation::{DerivationPath, PathSegment, BIP44_PURPOSE, HARDENED_OFFSET, SOLANA_COIN_TYPE};
pub use error::{CryptoError, CryptoResult};
pub use keys::{Keypair, PublicKey, Signature, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
pub use slip10::{derive_keypair, derive_public_key};
