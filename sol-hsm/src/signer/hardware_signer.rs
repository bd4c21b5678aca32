//! Hardware signer trait definition

use async_trait::async_trait;
use sol_crypto::{DerivationPath, PublicKey, Signature};

use crate::error::HsmResult;

/// Common interface for signing devices.
///
/// Implementations translate every transport failure into the closed
/// [`crate::HsmError`] set before returning.
#[async_trait]
pub trait HardwareSigner: Send + Sync {
    /// Path of the account this signer represents.
    fn derivation_path(&self) -> &DerivationPath;

    /// Public key at [`HardwareSigner::derivation_path`].
    async fn get_public_key(&self) -> HsmResult<PublicKey>;

    /// Ask the device to sign `message` with the key at `path`.
    ///
    /// The user confirms on the device; a rejection is
    /// [`crate::HsmError::UserRejected`].
    async fn sign_transaction(&self, path: &DerivationPath, message: &[u8]) -> HsmResult<Signature>;
}
