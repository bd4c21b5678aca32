//! Encrypted-at-rest root seed with a lock/unlock lifecycle.
//!
//! One [`EncryptedSeedRecord`] exists per installation. Creating or restoring
//! a wallet replaces it wholesale. The plaintext seed lives in memory only
//! between a successful [`SeedVault::unlock`] (or [`SeedVault::create`]) and
//! [`SeedVault::lock`].

use std::sync::Arc;

use parking_lot::RwLock;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sol_crypto::aead::{self, serde_hex, Sealed};
use sol_crypto::mnemonic::{self, WordCount};
use sol_crypto::scrypt::{DeriveScryptKey, ScryptParams};
use sol_crypto::CryptoError;
use sol_store::{ColumnId, Store};
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{WalletError, WalletResult};

pub const VAULT_COLUMN: ColumnId = ColumnId::new("vault");
pub const SEED_RECORD_KEY: &[u8] = b"seed-record";

const RECORD_VERSION: u8 = 1;
const SALT_SIZE: usize = 16;
const MIN_SEED_LENGTH: usize = 16;
const MAX_SEED_LENGTH: usize = 64;

/// Persisted form of the root seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSeedRecord {
    pub version: u8,
    pub kdf: ScryptParams,
    #[serde(with = "serde_hex")]
    pub salt: Vec<u8>,
    pub sealed: Sealed,
}

/// What gets sealed: the phrase for later display plus the seed itself.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct SeedPayload {
    mnemonic: String,
    seed: String,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct UnlockedSeed {
    mnemonic: String,
    seed: Vec<u8>,
}

pub struct SeedVault {
    store: Arc<dyn Store>,
    params: ScryptParams,
    unlocked: RwLock<Option<UnlockedSeed>>,
}

impl SeedVault {
    /// A locked vault over `store`. `params` apply to records created later;
    /// existing records carry their own.
    pub fn new(store: Arc<dyn Store>, params: ScryptParams) -> Self {
        Self {
            store,
            params,
            unlocked: RwLock::new(None),
        }
    }

    pub fn has_record(&self) -> WalletResult<bool> {
        Ok(self.store.contains(VAULT_COLUMN, SEED_RECORD_KEY)?)
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.read().is_some()
    }

    /// Encrypt and persist `seed`, replacing any prior record, and leave the
    /// vault unlocked.
    ///
    /// An empty password is accepted; the key then depends on the salt only.
    pub fn create(
        &self,
        mnemonic: &str,
        seed: &[u8],
        password: &str,
    ) -> WalletResult<EncryptedSeedRecord> {
        if !(MIN_SEED_LENGTH..=MAX_SEED_LENGTH).contains(&seed.len()) {
            return Err(CryptoError::InvalidSeedLength(seed.len()).into());
        }

        let mut salt = vec![0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let key = password.derive_scrypt_key(&salt, self.params)?;

        let payload = SeedPayload {
            mnemonic: mnemonic.to_string(),
            seed: hex::encode(seed),
        };
        let plaintext = Zeroizing::new(
            serde_json::to_vec(&payload).map_err(|e| WalletError::InvalidRecord(e.to_string()))?,
        );
        let sealed = aead::seal(&key, &plaintext)?;

        let record = EncryptedSeedRecord {
            version: RECORD_VERSION,
            kdf: self.params,
            salt,
            sealed,
        };
        let encoded =
            serde_json::to_vec(&record).map_err(|e| WalletError::InvalidRecord(e.to_string()))?;
        self.store.put(VAULT_COLUMN, SEED_RECORD_KEY.to_vec(), encoded)?;

        *self.unlocked.write() = Some(UnlockedSeed {
            mnemonic: mnemonic.to_string(),
            seed: seed.to_vec(),
        });
        info!(target: "sol::vault", kdf = %self.params, "seed record created");
        Ok(record)
    }

    /// Validate `phrase`, derive its BIP-39 seed and [`create`](Self::create)
    /// a record from it.
    pub fn restore(&self, phrase: &str, password: &str) -> WalletResult<EncryptedSeedRecord> {
        let normalized = Zeroizing::new(mnemonic::normalize(phrase));
        let seed = mnemonic::to_seed(&normalized)?;
        self.create(&normalized, seed.as_slice(), password)
    }

    /// Create a wallet from a fresh random phrase and return the phrase.
    pub fn generate(&self, words: WordCount, password: &str) -> WalletResult<Zeroizing<String>> {
        let phrase = mnemonic::generate(words)?;
        let seed = mnemonic::to_seed(&phrase)?;
        self.create(&phrase, seed.as_slice(), password)?;
        Ok(phrase)
    }

    pub fn load_record(&self) -> WalletResult<Option<EncryptedSeedRecord>> {
        self.store
            .get(VAULT_COLUMN, SEED_RECORD_KEY)?
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| WalletError::InvalidRecord(e.to_string()))
            })
            .transpose()
    }

    /// Decrypt the persisted record and hold the seed until [`lock`](Self::lock).
    pub fn unlock(&self, password: &str) -> WalletResult<()> {
        let record = self.load_record()?.ok_or(WalletError::NoRecord)?;
        if record.version != RECORD_VERSION {
            return Err(WalletError::InvalidRecord(format!(
                "unsupported record version {}",
                record.version
            )));
        }

        let key = password.derive_scrypt_key(&record.salt, record.kdf)?;
        let plaintext = aead::open(&key, &record.sealed).map_err(|err| match err {
            CryptoError::Authentication => {
                warn!(target: "sol::vault", "unlock failed: wrong password");
                WalletError::WrongPassword
            }
            other => other.into(),
        })?;

        let payload: SeedPayload = serde_json::from_slice(&plaintext)
            .map_err(|e| WalletError::InvalidRecord(e.to_string()))?;
        let seed = hex::decode(&payload.seed)
            .map_err(|e| WalletError::InvalidRecord(format!("seed encoding: {e}")))?;

        *self.unlocked.write() = Some(UnlockedSeed {
            mnemonic: payload.mnemonic.clone(),
            seed,
        });
        debug!(target: "sol::vault", "vault unlocked");
        Ok(())
    }

    /// Drop the in-memory seed. Waits for in-flight derivations to finish.
    pub fn lock(&self) {
        if self.unlocked.write().take().is_some() {
            debug!(target: "sol::vault", "vault locked");
        }
    }

    /// Run `f` against the unlocked seed. The vault cannot lock meanwhile.
    pub fn with_seed<R>(&self, f: impl FnOnce(&[u8]) -> R) -> WalletResult<R> {
        let guard = self.unlocked.read();
        let unlocked = guard.as_ref().ok_or(WalletError::Locked)?;
        Ok(f(&unlocked.seed))
    }

    /// The recovery phrase, for display while unlocked.
    pub fn mnemonic(&self) -> WalletResult<Zeroizing<String>> {
        let guard = self.unlocked.read();
        let unlocked = guard.as_ref().ok_or(WalletError::Locked)?;
        Ok(Zeroizing::new(unlocked.mnemonic.clone()))
    }
}

#[cfg(test)]
mod tests {
    use sol_store::MemoryStore;

    use super::*;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn vault(store: &Arc<MemoryStore>) -> SeedVault {
        SeedVault::new(store.clone(), ScryptParams::FAST)
    }

    #[test]
    fn lock_waits_for_in_flight_derivation() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::{mpsc, Mutex};
        use std::thread;
        use std::time::Duration;

        let store = Arc::new(MemoryStore::new());
        let vault = vault(&store);
        let seed = [0x42u8; 64];
        vault.create(PHRASE, &seed, "p").unwrap();

        let events = Mutex::new(Vec::new());
        let locked = AtomicBool::new(false);
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let (vault, events, locked) = (&vault, &events, &locked);
        thread::scope(|scope| {
            let deriving = scope.spawn(move || {
                vault
                    .with_seed(|s| {
                        entered_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                        let copy = s.to_vec();
                        events.lock().unwrap().push("derived");
                        copy
                    })
                    .unwrap()
            });

            entered_rx.recv().unwrap();
            let locking = scope.spawn(move || {
                vault.lock();
                locked.store(true, Ordering::SeqCst);
                events.lock().unwrap().push("locked");
            });

            thread::sleep(Duration::from_millis(50));
            assert!(!locked.load(Ordering::SeqCst), "lock returned mid-derivation");
            release_tx.send(()).unwrap();

            assert_eq!(deriving.join().unwrap(), seed.to_vec());
            locking.join().unwrap();
        });

        assert_eq!(*events.lock().unwrap(), vec!["derived", "locked"]);
        assert!(!vault.is_unlocked());
        assert!(matches!(vault.with_seed(|s| s.len()), Err(WalletError::Locked)));
    }

    #[test]
    fn create_then_unlock_returns_same_seed() {
        let store = Arc::new(MemoryStore::new());
        let seed = [9u8; 64];
        vault(&store).create(PHRASE, &seed, "p").unwrap();

        let reopened = vault(&store);
        assert!(reopened.has_record().unwrap());
        assert!(!reopened.is_unlocked());
        reopened.unlock("p").unwrap();
        assert!(reopened.is_unlocked());
        assert_eq!(reopened.with_seed(|s| s.to_vec()).unwrap(), seed.to_vec());
        assert_eq!(reopened.mnemonic().unwrap().as_str(), PHRASE);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        vault(&store).create(PHRASE, &[1u8; 64], "correct").unwrap();

        let reopened = vault(&store);
        assert!(matches!(reopened.unlock("wrong"), Err(WalletError::WrongPassword)));
        assert!(!reopened.is_unlocked());
        assert!(matches!(reopened.with_seed(|_| ()), Err(WalletError::Locked)));
    }

    #[test]
    fn empty_password_round_trips() {
        let store = Arc::new(MemoryStore::new());
        vault(&store).create(PHRASE, &[3u8; 32], "").unwrap();

        let reopened = vault(&store);
        reopened.unlock("").unwrap();
        assert!(matches!(vault(&store).unlock("x"), Err(WalletError::WrongPassword)));
    }

    #[test]
    fn unlock_without_record() {
        let store = Arc::new(MemoryStore::new());
        assert!(!vault(&store).has_record().unwrap());
        assert!(matches!(vault(&store).unlock("p"), Err(WalletError::NoRecord)));
    }

    #[test]
    fn lock_clears_seed() {
        let store = Arc::new(MemoryStore::new());
        let vault = vault(&store);
        vault.create(PHRASE, &[5u8; 64], "p").unwrap();
        assert!(vault.is_unlocked());
        vault.lock();
        assert!(!vault.is_unlocked());
        assert!(matches!(vault.mnemonic(), Err(WalletError::Locked)));
    }

    #[test]
    fn restore_replaces_prior_record() {
        let store = Arc::new(MemoryStore::new());
        let vault = vault(&store);
        let first = vault.create("first phrase", &[1u8; 64], "p").unwrap();
        let second = vault.restore(PHRASE, "p").unwrap();
        assert_ne!(first.salt, second.salt);
        assert_eq!(vault.load_record().unwrap(), Some(second));

        vault.lock();
        vault.unlock("p").unwrap();
        let seed = vault.with_seed(|s| hex::encode(s)).unwrap();
        assert!(seed.starts_with("5eb00bbddcf069084889a8ab91555681"));
    }

    #[test]
    fn restore_rejects_bad_phrase() {
        let store = Arc::new(MemoryStore::new());
        let err = vault(&store).restore("not a real phrase", "p").unwrap_err();
        assert!(matches!(err, WalletError::Crypto(CryptoError::InvalidMnemonic(_))));
        assert!(!vault(&store).has_record().unwrap());
    }

    #[test]
    fn rejects_short_seed() {
        let store = Arc::new(MemoryStore::new());
        let err = vault(&store).create(PHRASE, &[0u8; 8], "p").unwrap_err();
        assert!(matches!(err, WalletError::Crypto(CryptoError::InvalidSeedLength(8))));
    }

    #[test]
    fn generated_phrase_unlocks() {
        let store = Arc::new(MemoryStore::new());
        let phrase = vault(&store).generate(WordCount::TwentyFour, "p").unwrap();
        assert_eq!(phrase.split_whitespace().count(), 24);

        let reopened = vault(&store);
        reopened.unlock("p").unwrap();
        assert_eq!(reopened.mnemonic().unwrap().as_str(), phrase.as_str());
    }
}
