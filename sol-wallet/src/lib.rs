//! # sol-wallet
//!
//! Key management and signing for the wallet.
//!
//! - [`SeedVault`]: the root seed, encrypted at rest with a password derived
//!   key, plaintext in memory only while unlocked.
//! - [`AccountRegistry`]: local accounts derived at `m/44'/501'/i'/0'` plus
//!   at most one hardware account, always last.
//! - [`Signer`]: local keypair or hardware device, chosen per account.
//! - [`SigningDispatcher`]: builds transfer messages, signs them with the
//!   selected account and hands them to a [`ClusterClient`].
//!
//! All of it hangs off a [`WalletSession`] owned by the caller.

pub mod accounts;
pub mod cluster;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod session;
pub mod signer;
pub mod vault;

pub use accounts::{AccountKind, AccountRegistry, WalletAccount};
pub use cluster::{ClusterClient, OfflineCluster};
pub use dispatcher::{SignedEnvelope, SigningDispatcher};
pub use error::{WalletError, WalletResult};
pub use message::{Hash, Message, Transaction};
pub use session::WalletSession;
pub use signer::{HardwareAccountSigner, LocalSigner, Signer};
pub use vault::{EncryptedSeedRecord, SeedVault};
