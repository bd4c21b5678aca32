//! Signers for the active account.

use std::sync::Arc;

use sol_crypto::{derive_keypair, DerivationPath, Keypair, PublicKey, Signature};
use sol_hsm::HardwareSigner;
use tracing::debug;

use crate::accounts::AccountRegistry;
use crate::error::WalletResult;
use crate::vault::SeedVault;

/// Software key derived from the vault seed. The secret is zeroized when the
/// signer is dropped.
#[derive(Debug)]
pub struct LocalSigner {
    index: usize,
    keypair: Keypair,
}

impl LocalSigner {
    /// Derive local account `index` from the unlocked vault.
    pub fn derive(vault: &SeedVault, index: usize) -> WalletResult<Self> {
        let path = AccountRegistry::local_path(index)?;
        let keypair = vault.with_seed(|seed| derive_keypair(seed, &path))??;
        Ok(Self { index, keypair })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.keypair.sign(message)
    }
}

/// The hardware slot: a known public key plus the device that holds it.
pub struct HardwareAccountSigner {
    device: Arc<dyn HardwareSigner>,
    public_key: PublicKey,
}

impl HardwareAccountSigner {
    pub fn new(device: Arc<dyn HardwareSigner>, public_key: PublicKey) -> Self {
        Self { device, public_key }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn derivation_path(&self) -> &DerivationPath {
        self.device.derivation_path()
    }

    pub async fn sign(&self, message: &[u8]) -> WalletResult<Signature> {
        let signature = self
            .device
            .sign_transaction(self.device.derivation_path(), message)
            .await?;
        Ok(signature)
    }
}

pub enum Signer {
    Local(LocalSigner),
    Hardware(HardwareAccountSigner),
}

impl Signer {
    pub fn public_key(&self) -> PublicKey {
        match self {
            Signer::Local(signer) => signer.public_key(),
            Signer::Hardware(signer) => signer.public_key(),
        }
    }

    pub fn is_hardware(&self) -> bool {
        matches!(self, Signer::Hardware(_))
    }

    pub async fn sign(&self, message: &[u8]) -> WalletResult<Signature> {
        debug!(
            target: "sol::wallet",
            signer = %self.public_key(),
            hardware = self.is_hardware(),
            len = message.len(),
            "signing message"
        );
        match self {
            Signer::Local(signer) => Ok(signer.sign(message)),
            Signer::Hardware(signer) => signer.sign(message).await,
        }
    }
}
