//! # sol-hsm
//!
//! Hardware signing device support for the wallet.
//!
//! The device exposes a fixed-size command buffer, so instruction payloads
//! larger than [`apdu::MAX_PAYLOAD`] are split into continuation chunks by
//! [`DeviceTransport`]. Each interaction runs inside a [`DeviceSession`]: only
//! one may be open per device, it is bounded by the interaction timeout, and
//! it is closed on every exit path.
//!
//! ## Features
//!
//! - `simulation` (default): software device speaking the signing app protocol
//! - `ledger`: Ledger hardware wallet support via USB HID
//!
//! ## Usage
//!
//! ```ignore
//! use sol_hsm::{HardwareSigner, HidConnector, HsmConfig, LedgerSigner};
//!
//! let signer = LedgerSigner::new(Arc::new(HidConnector::new(0)), HsmConfig::default());
//! let public_key = signer.get_public_key().await?;
//! let signature = signer.sign_transaction(signer.derivation_path(), &message).await?;
//! ```

pub mod apdu;
pub mod channel;
pub mod config;
pub mod error;
pub mod hid;
pub mod session;
pub mod signer;
pub mod transport;

#[cfg(feature = "ledger")]
pub mod ledger;

#[cfg(feature = "simulation")]
pub mod simulation;

// Re-exports
pub use apdu::Apdu;
pub use channel::{DeviceChannel, DeviceConnector};
pub use config::HsmConfig;
pub use error::{HsmError, HsmResult, TransportError};
pub use session::{DeviceSession, SessionGate};
pub use signer::{HardwareSigner, LedgerSigner};
pub use transport::DeviceTransport;

#[cfg(feature = "ledger")]
pub use ledger::HidConnector;

#[cfg(feature = "simulation")]
pub use simulation::{Fault, SimulatedDevice};
