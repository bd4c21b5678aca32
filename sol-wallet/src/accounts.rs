//! Ordered account list: derived local accounts plus an optional trailing
//! hardware slot.

use std::fmt;
use std::sync::Arc;

use sol_crypto::{derive_public_key, DerivationPath, PublicKey};
use sol_store::{ColumnId, Store, StoreError, WriteBatch};
use tracing::info;

use crate::error::{WalletError, WalletResult};
use crate::vault::SeedVault;

pub const ACCOUNTS_COLUMN: ColumnId = ColumnId::new("accounts");
pub const WALLET_INDEX_KEY: &[u8] = b"wallet-index";
pub const WALLET_COUNT_KEY: &[u8] = b"wallet-count";
pub const LEDGER_PUBKEY_KEY: &[u8] = b"ledger-pubkey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Local,
    Hardware,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Local => f.write_str("local"),
            AccountKind::Hardware => f.write_str("ledger"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAccount {
    pub index: usize,
    pub kind: AccountKind,
    pub public_key: PublicKey,
}

/// Selection state over the account list.
///
/// Indices `0..local_count` are local accounts derived at
/// `m/44'/501'/i'/0'`; when a hardware key is attached it occupies index
/// `local_count`, always last.
pub struct AccountRegistry {
    store: Arc<dyn Store>,
    local_count: usize,
    hardware_key: Option<PublicKey>,
    selected: usize,
}

impl AccountRegistry {
    /// Restore the persisted scalars, defaulting to one local account.
    pub fn load(store: Arc<dyn Store>) -> WalletResult<Self> {
        let count = read_usize(store.as_ref(), WALLET_COUNT_KEY)?.unwrap_or(1).max(1);
        let hardware_key = store
            .get(ACCOUNTS_COLUMN, LEDGER_PUBKEY_KEY)?
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                let text = String::from_utf8_lossy(&raw).into_owned();
                text.parse::<PublicKey>()
                    .map_err(|_| StoreError::corrupt(LEDGER_PUBKEY_KEY, "invalid public key"))
            })
            .transpose()?;

        // the persisted count includes the hardware slot
        let local_count = match hardware_key {
            Some(_) => count.saturating_sub(1).max(1),
            None => count,
        };
        let total = local_count + usize::from(hardware_key.is_some());
        let selected = read_usize(store.as_ref(), WALLET_INDEX_KEY)?
            .unwrap_or(0)
            .min(total - 1);

        Ok(Self {
            store,
            local_count,
            hardware_key,
            selected,
        })
    }

    pub fn local_count(&self) -> usize {
        self.local_count
    }

    /// Total slots, the hardware slot included.
    pub fn len(&self) -> usize {
        self.local_count + usize::from(self.hardware_key.is_some())
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn hardware_key(&self) -> Option<PublicKey> {
        self.hardware_key
    }

    pub fn kind_of(&self, index: usize) -> Option<AccountKind> {
        if index < self.local_count {
            Some(AccountKind::Local)
        } else if index == self.local_count && self.hardware_key.is_some() {
            Some(AccountKind::Hardware)
        } else {
            None
        }
    }

    /// Derivation path of local account `index`.
    pub fn local_path(index: usize) -> WalletResult<DerivationPath> {
        u32::try_from(index)
            .ok()
            .and_then(|account| DerivationPath::for_account(account).ok())
            .ok_or(WalletError::AccountOutOfRange(index))
    }

    /// Select an account.
    ///
    /// With `hardware_key` the hardware slot is attached (or its key
    /// replaced) and selected; `index` is ignored. Without it, an index past
    /// the existing slots adds exactly one local account and selects it.
    /// Selecting never removes an account.
    pub fn select(&mut self, index: usize, hardware_key: Option<PublicKey>) -> WalletResult<usize> {
        let mut local_count = self.local_count;
        let mut attached = self.hardware_key;

        let selected = match hardware_key {
            Some(key) => {
                attached = Some(key);
                local_count
            }
            None if index < self.len() => index,
            None => {
                local_count += 1;
                local_count - 1
            }
        };

        self.persist(local_count, attached, selected)?;
        if local_count != self.local_count || attached != self.hardware_key {
            info!(
                target: "sol::wallet",
                local_accounts = local_count,
                hardware = attached.is_some(),
                "account registry grew"
            );
        }
        self.local_count = local_count;
        self.hardware_key = attached;
        self.selected = selected;
        Ok(selected)
    }

    /// Every account with its public key. Local keys need the vault unlocked.
    pub fn accounts(&self, vault: &SeedVault) -> WalletResult<Vec<WalletAccount>> {
        let mut accounts = vault.with_seed(|seed| {
            (0..self.local_count)
                .map(|index| {
                    let path = Self::local_path(index)?;
                    Ok(WalletAccount {
                        index,
                        kind: AccountKind::Local,
                        public_key: derive_public_key(seed, &path)?,
                    })
                })
                .collect::<WalletResult<Vec<_>>>()
        })??;

        if let Some(public_key) = self.hardware_key {
            accounts.push(WalletAccount {
                index: self.local_count,
                kind: AccountKind::Hardware,
                public_key,
            });
        }
        Ok(accounts)
    }

    /// All three scalars in one atomic batch.
    fn persist(
        &self,
        local_count: usize,
        hardware_key: Option<PublicKey>,
        selected: usize,
    ) -> WalletResult<()> {
        let count = local_count + usize::from(hardware_key.is_some());
        let mut batch = WriteBatch::new();
        batch.put(ACCOUNTS_COLUMN, WALLET_INDEX_KEY, selected.to_string());
        batch.put(ACCOUNTS_COLUMN, WALLET_COUNT_KEY, count.to_string());
        match hardware_key {
            Some(key) => batch.put(ACCOUNTS_COLUMN, LEDGER_PUBKEY_KEY, key.to_base58()),
            None => batch.delete(ACCOUNTS_COLUMN, LEDGER_PUBKEY_KEY),
        }
        self.store.write_batch(batch)?;
        Ok(())
    }
}

fn read_usize(store: &dyn Store, key: &[u8]) -> WalletResult<Option<usize>> {
    let Some(raw) = store.get(ACCOUNTS_COLUMN, key)? else {
        return Ok(None);
    };
    std::str::from_utf8(&raw)
        .ok()
        .and_then(|text| text.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| StoreError::corrupt(key, "not a decimal integer").into())
}

#[cfg(test)]
mod tests {
    use sol_crypto::scrypt::ScryptParams;
    use sol_store::MemoryStore;

    use super::*;

    fn registry() -> (Arc<MemoryStore>, AccountRegistry) {
        let store = Arc::new(MemoryStore::new());
        let registry = AccountRegistry::load(store.clone()).unwrap();
        (store, registry)
    }

    #[test]
    fn starts_with_one_local_account() {
        let (_, registry) = registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.selected(), 0);
        assert_eq!(registry.kind_of(0), Some(AccountKind::Local));
        assert_eq!(registry.kind_of(1), None);
    }

    #[test]
    fn local_paths_stay_below_the_hardened_bit() {
        assert_eq!(
            AccountRegistry::local_path(3).unwrap().to_string(),
            "m/44'/501'/3'/0'"
        );
        let limit = 0x8000_0000usize;
        assert!(AccountRegistry::local_path(limit - 1).is_ok());
        assert!(matches!(
            AccountRegistry::local_path(limit),
            Err(WalletError::AccountOutOfRange(i)) if i == limit
        ));
    }

    #[test]
    fn selecting_past_the_end_adds_one_account() {
        let (_, mut registry) = registry();
        assert_eq!(registry.select(5, None).unwrap(), 1);
        assert_eq!(registry.local_count(), 2);
        assert_eq!(registry.select(0, None).unwrap(), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn hardware_slot_stays_last() {
        let (_, mut registry) = registry();
        let key = PublicKey::new([4u8; 32]);
        assert_eq!(registry.select(0, Some(key)).unwrap(), 1);
        assert_eq!(registry.kind_of(1), Some(AccountKind::Hardware));

        // a new local account pushes the hardware slot back
        assert_eq!(registry.select(2, None).unwrap(), 1);
        assert_eq!(registry.kind_of(1), Some(AccountKind::Local));
        assert_eq!(registry.kind_of(2), Some(AccountKind::Hardware));

        // reattaching replaces the key instead of adding a slot
        let other = PublicKey::new([5u8; 32]);
        assert_eq!(registry.select(0, Some(other)).unwrap(), 2);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.hardware_key(), Some(other));
    }

    #[test]
    fn state_survives_reload() {
        let (store, mut registry) = registry();
        registry.select(1, None).unwrap();
        registry.select(0, Some(PublicKey::new([8u8; 32]))).unwrap();

        let reloaded = AccountRegistry::load(store).unwrap();
        assert_eq!(reloaded.local_count(), 2);
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.selected(), 2);
        assert_eq!(reloaded.hardware_key(), Some(PublicKey::new([8u8; 32])));
    }

    #[test]
    fn corrupt_scalar_is_reported() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(ACCOUNTS_COLUMN, WALLET_COUNT_KEY.to_vec(), b"many".to_vec())
            .unwrap();
        assert!(matches!(
            AccountRegistry::load(store),
            Err(WalletError::Store(StoreError::Corrupt { .. }))
        ));
    }

    #[test]
    fn lists_derived_keys() {
        let store = Arc::new(MemoryStore::new());
        let vault = SeedVault::new(store.clone(), ScryptParams::FAST);
        let seed = [0x42u8; 64];
        vault.create("phrase", &seed, "").unwrap();

        let mut registry = AccountRegistry::load(store).unwrap();
        registry.select(1, None).unwrap();
        let accounts = registry.accounts(&vault).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(
            accounts[1].public_key,
            derive_public_key(&seed, &"m/44'/501'/1'/0'".parse().unwrap()).unwrap()
        );

        vault.lock();
        assert!(matches!(registry.accounts(&vault), Err(WalletError::Locked)));
    }
}
