//! AES-256-GCM sealing of small secrets.
//!
//! A wrong key is detected through the authentication tag and surfaces as
//! [`CryptoError::Authentication`]; decryption never returns unverified bytes.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

pub const AES256_KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;

/// Ciphertext (with appended tag) and the nonce it was sealed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sealed {
    #[serde(with = "serde_hex")]
    pub nonce: Vec<u8>,
    #[serde(with = "serde_hex")]
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn seal(key: &[u8; AES256_KEY_SIZE], plaintext: &[u8]) -> CryptoResult<Sealed> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(Sealed {
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Decrypt and authenticate `sealed` under `key`.
pub fn open(key: &[u8; AES256_KEY_SIZE], sealed: &Sealed) -> CryptoResult<Zeroizing<Vec<u8>>> {
    if sealed.nonce.len() != NONCE_SIZE {
        return Err(CryptoError::Encryption(format!(
            "nonce must be {} bytes, got {}",
            NONCE_SIZE,
            sealed.nonce.len()
        )));
    }
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::Encryption(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Authentication)
}

/// Serde adapter storing byte vectors as hex strings.
pub mod serde_hex {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open() {
        let key = [0x11u8; 32];
        let sealed = seal(&key, b"root seed bytes").unwrap();
        assert_eq!(sealed.nonce.len(), NONCE_SIZE);
        assert_ne!(sealed.ciphertext, b"root seed bytes");
        let opened = open(&key, &sealed).unwrap();
        assert_eq!(opened.as_slice(), b"root seed bytes");
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = seal(&[0x11u8; 32], b"secret").unwrap();
        assert_eq!(
            open(&[0x12u8; 32], &sealed).unwrap_err(),
            CryptoError::Authentication
        );
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let key = [0x42u8; 32];
        let mut sealed = seal(&key, b"secret").unwrap();
        sealed.ciphertext[0] ^= 0x01;
        assert_eq!(open(&key, &sealed).unwrap_err(), CryptoError::Authentication);
    }

    #[test]
    fn nonces_are_fresh() {
        let key = [7u8; 32];
        let a = seal(&key, b"x").unwrap();
        let b = seal(&key, b"x").unwrap();
        assert_ne!(a.nonce, b.nonce);
    }
}
