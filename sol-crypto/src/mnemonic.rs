//! BIP-39 mnemonic phrases.
//!
//! New wallets get a fresh English phrase; restoring re-derives the 64-byte
//! root seed from the phrase with an empty BIP-39 passphrase.

use bip39::{Language, Mnemonic};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

pub const SEED_LENGTH: usize = 64;

/// Supported phrase lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordCount {
    #[default]
    Twelve,
    TwentyFour,
}

impl WordCount {
    fn entropy_len(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::TwentyFour => 32,
        }
    }

    pub fn words(self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::TwentyFour => 24,
        }
    }
}

impl TryFrom<usize> for WordCount {
    type Error = CryptoError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            12 => Ok(WordCount::Twelve),
            24 => Ok(WordCount::TwentyFour),
            other => Err(CryptoError::InvalidMnemonic(format!(
                "unsupported word count {other}"
            ))),
        }
    }
}

/// Generate a new random phrase.
pub fn generate(words: WordCount) -> CryptoResult<Zeroizing<String>> {
    let mut entropy = Zeroizing::new([0u8; 32]);
    let entropy = &mut entropy[..words.entropy_len()];
    OsRng.fill_bytes(entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Collapse whitespace and case so pasted phrases parse.
pub fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check word list membership and checksum.
pub fn validate(phrase: &str) -> CryptoResult<()> {
    parse(phrase).map(|_| ())
}

/// BIP-39 seed for `phrase` with an empty passphrase.
pub fn to_seed(phrase: &str) -> CryptoResult<Zeroizing<[u8; SEED_LENGTH]>> {
    let mnemonic = parse(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed_normalized("")))
}

fn parse(phrase: &str) -> CryptoResult<Mnemonic> {
    let normalized = Zeroizing::new(normalize(phrase));
    Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))
}
