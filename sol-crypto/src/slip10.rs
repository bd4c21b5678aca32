//! SLIP-0010 key derivation for ed25519.
//!
//! ed25519 has no public-parent-to-public-child derivation, so every level of
//! the path must be hardened. Identical seed and path always produce the same
//! keypair; the function performs no I/O and may run on any thread.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use crate::derivation::DerivationPath;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{Keypair, PublicKey};

type HmacSha512 = Hmac<Sha512>;

const MASTER_KEY_DOMAIN: &[u8] = b"ed25519 seed";

/// Root seed lengths accepted by SLIP-0010 (128 to 512 bits)
const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

/// Secret key and chain code at one level of the tree.
struct ExtendedKey {
    key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    fn from_hmac(mac: HmacSha512) -> Self {
        let mut output = mac.finalize().into_bytes();
        let mut key = Zeroizing::new([0u8; 32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&output[..32]);
        chain_code.copy_from_slice(&output[32..]);
        output.as_mut_slice().zeroize();
        Self { key, chain_code }
    }

    fn master(seed: &[u8]) -> CryptoResult<Self> {
        let mut mac = HmacSha512::new_from_slice(MASTER_KEY_DOMAIN)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        mac.update(seed);
        Ok(Self::from_hmac(mac))
    }

    fn child(&self, encoded_index: u32) -> CryptoResult<Self> {
        let mut mac = HmacSha512::new_from_slice(self.chain_code.as_slice())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        mac.update(&[0x00]);
        mac.update(self.key.as_slice());
        mac.update(&encoded_index.to_be_bytes());
        Ok(Self::from_hmac(mac))
    }
}

/// Derive the keypair at `path` under `seed`.
pub fn derive_keypair(seed: &[u8], path: &DerivationPath) -> CryptoResult<Keypair> {
    if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
        return Err(CryptoError::InvalidSeedLength(seed.len()));
    }
    if let Some(segment) = path.segments().iter().find(|s| !s.hardened) {
        return Err(CryptoError::NonHardenedSegment {
            index: segment.index,
        });
    }

    let mut node = ExtendedKey::master(seed)?;
    for segment in path.segments() {
        node = node.child(segment.encoded())?;
    }

    Ok(Keypair::from_secret(&node.key))
}

/// Public key at `path`; the secret half is dropped before returning.
pub fn derive_public_key(seed: &[u8], path: &DerivationPath) -> CryptoResult<PublicKey> {
    derive_keypair(seed, path).map(|keypair| keypair.public_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::PathSegment;
    use hex_literal::hex;

    // SLIP-0010 test vector 1 for ed25519
    const VECTOR_SEED: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");

    fn path(indices: &[u32]) -> DerivationPath {
        DerivationPath::new(indices.iter().map(|i| PathSegment::hardened(*i)).collect()).unwrap()
    }

    #[test]
    fn slip10_vector_one_chain() {
        let keypair = derive_keypair(&VECTOR_SEED, &path(&[0])).unwrap();
        assert_eq!(
            &keypair.secret_bytes()[..32],
            &hex!("68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3")
        );
        assert_eq!(
            keypair.public_key().as_bytes(),
            &hex!("8c8a13df77a28f3445213a0f432fde644acaa215fc72dcdf300d5efaa85d350c")
        );

        let keypair = derive_keypair(&VECTOR_SEED, &path(&[0, 1])).unwrap();
        assert_eq!(
            &keypair.secret_bytes()[..32],
            &hex!("b1d0bad404bf35da785a64ca1ac54b2617211d2777696fbffaf208f746ae84f2")
        );
    }

    #[test]
    fn rejects_non_hardened_segment() {
        let path: DerivationPath = "m/44'/501'/0'/0".parse().unwrap();
        let err = derive_keypair(&[7u8; 64], &path).unwrap_err();
        assert_eq!(err, CryptoError::NonHardenedSegment { index: 0 });
    }

    #[test]
    fn rejects_bad_seed_length() {
        let path = DerivationPath::for_account(0).unwrap();
        assert_eq!(
            derive_keypair(&[1u8; 8], &path).unwrap_err(),
            CryptoError::InvalidSeedLength(8)
        );
        assert_eq!(
            derive_keypair(&[1u8; 65], &path).unwrap_err(),
            CryptoError::InvalidSeedLength(65)
        );
    }

    #[test]
    fn public_key_matches_keypair() {
        let seed = [3u8; 64];
        let path = DerivationPath::for_account(2).unwrap();
        assert_eq!(
            derive_public_key(&seed, &path).unwrap(),
            derive_keypair(&seed, &path).unwrap().public_key()
        );
    }
}
