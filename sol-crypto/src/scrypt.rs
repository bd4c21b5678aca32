//! Password-based key derivation with scrypt.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// Symmetric key length produced for sealing
pub const DERIVED_KEY_SIZE: usize = 32;

/// scrypt cost parameters, stored alongside every sealed record so a record
/// stays readable after the defaults change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScryptParams {
    /// log2 of the CPU/memory cost N
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl ScryptParams {
    /// Interactive-unlock cost, N = 2^15.
    pub const DEFAULT: ScryptParams = ScryptParams {
        log_n: 15,
        r: 8,
        p: 1,
    };

    /// Cheap parameters for tests.
    pub const FAST: ScryptParams = ScryptParams {
        log_n: 4,
        r: 8,
        p: 1,
    };

    pub fn validate(&self) -> CryptoResult<()> {
        self.to_params().map(|_| ())
    }

    fn to_params(self) -> CryptoResult<scrypt::Params> {
        scrypt::Params::new(self.log_n, self.r, self.p, DERIVED_KEY_SIZE)
            .map_err(|_| CryptoError::InvalidKdfParams(self.to_string()))
    }
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl core::fmt::Display for ScryptParams {
    #[inline]
    fn fmt(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::write!(
            formatter,
            "ScryptParams{{log_n:{},r:{},p:{}}}",
            self.log_n,
            self.r,
            self.p
        )
    }
}

pub trait DeriveScryptKey {
    fn derive_scrypt_key(
        &self,
        salt: &[u8],
        params: ScryptParams,
    ) -> CryptoResult<Zeroizing<[u8; DERIVED_KEY_SIZE]>>;
}

impl<T: AsRef<[u8]> + ?Sized> DeriveScryptKey for T {
    /// An empty password is valid input and yields a fixed key per salt.
    fn derive_scrypt_key(
        &self,
        salt: &[u8],
        params: ScryptParams,
    ) -> CryptoResult<Zeroizing<[u8; DERIVED_KEY_SIZE]>> {
        let scrypt_params = params.to_params()?;

        let mut derived = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
        scrypt::scrypt(self.as_ref(), salt, &scrypt_params, derived.as_mut_slice())
            .map_err(|_| CryptoError::InvalidKdfParams("invalid derived length".to_string()))?;

        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_key() {
        let a = "hunter2".derive_scrypt_key(b"salt", ScryptParams::FAST).unwrap();
        let b = "hunter2".derive_scrypt_key(b"salt", ScryptParams::FAST).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn salt_and_password_change_the_key() {
        let base = "p".derive_scrypt_key(b"salt-a", ScryptParams::FAST).unwrap();
        let other_salt = "p".derive_scrypt_key(b"salt-b", ScryptParams::FAST).unwrap();
        let other_pass = "q".derive_scrypt_key(b"salt-a", ScryptParams::FAST).unwrap();
        assert_ne!(*base, *other_salt);
        assert_ne!(*base, *other_pass);
    }

    #[test]
    fn empty_password_is_accepted() {
        assert!("".derive_scrypt_key(b"salt", ScryptParams::FAST).is_ok());
    }

    #[test]
    fn rejects_invalid_params() {
        let params = ScryptParams {
            log_n: 0,
            r: 0,
            p: 0,
        };
        assert!(params.validate().is_err());
        assert!(ScryptParams::DEFAULT.validate().is_ok());
    }
}
