//! Caller-owned wallet context.

use std::sync::Arc;

use sol_crypto::scrypt::ScryptParams;
use sol_crypto::PublicKey;
use sol_hsm::HardwareSigner;
use sol_store::Store;
use tracing::info;

use crate::accounts::{AccountKind, AccountRegistry, WalletAccount};
use crate::error::{WalletError, WalletResult};
use crate::signer::{HardwareAccountSigner, LocalSigner, Signer};
use crate::vault::SeedVault;

/// Vault, account selection and the attached signing device, passed
/// explicitly to whatever signs on the user's behalf.
pub struct WalletSession {
    pub vault: SeedVault,
    pub registry: AccountRegistry,
    hardware: Option<Arc<dyn HardwareSigner>>,
}

impl WalletSession {
    /// Open a session over `store`. The vault starts locked.
    pub fn open(store: Arc<dyn Store>, params: ScryptParams) -> WalletResult<Self> {
        Ok(Self {
            vault: SeedVault::new(store.clone(), params),
            registry: AccountRegistry::load(store)?,
            hardware: None,
        })
    }

    pub fn hardware(&self) -> Option<&Arc<dyn HardwareSigner>> {
        self.hardware.as_ref()
    }

    /// Attach a device without touching the registry, e.g. when the hardware
    /// slot already exists from an earlier run.
    pub fn attach_hardware(&mut self, device: Arc<dyn HardwareSigner>) {
        self.hardware = Some(device);
    }

    /// Read the device's public key, attach it as the hardware account and
    /// select it.
    pub async fn connect_hardware(&mut self, device: Arc<dyn HardwareSigner>) -> WalletResult<PublicKey> {
        let key = device.get_public_key().await?;
        self.registry.select(self.registry.len(), Some(key))?;
        self.hardware = Some(device);
        info!(target: "sol::wallet", public_key = %key, "hardware account connected");
        Ok(key)
    }

    pub fn accounts(&self) -> WalletResult<Vec<WalletAccount>> {
        self.registry.accounts(&self.vault)
    }

    pub fn select(&mut self, index: usize) -> WalletResult<usize> {
        self.registry.select(index, None)
    }

    /// Signer for the selected account.
    pub fn resolve_signer(&self) -> WalletResult<Signer> {
        let index = self.registry.selected();
        match self.registry.kind_of(index) {
            Some(AccountKind::Local) => Ok(Signer::Local(LocalSigner::derive(&self.vault, index)?)),
            Some(AccountKind::Hardware) => {
                let device = self.hardware.clone().ok_or(WalletError::HardwareNotConnected)?;
                let key = self
                    .registry
                    .hardware_key()
                    .ok_or(WalletError::AccountOutOfRange(index))?;
                Ok(Signer::Hardware(HardwareAccountSigner::new(device, key)))
            }
            None => Err(WalletError::AccountOutOfRange(index)),
        }
    }
}
