//! Hierarchical key paths.
//!
//! Paths are rooted at `m/44'/501'` (BIP-44 purpose, Solana coin type). The
//! wallet appends an account segment and optionally a change segment, all
//! hardened. The byte form is what the hardware signing app consumes: one
//! length byte followed by each segment as a big-endian `u32`, with the top
//! bit set on hardened segments.

use std::fmt;
use std::str::FromStr;

use crate::error::{CryptoError, CryptoResult};

/// Bit set on the serialized index of a hardened segment
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// BIP-44 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// Registered coin type for Solana
pub const SOLANA_COIN_TYPE: u32 = 501;

/// Largest segment count whose length fits the one-byte prefix
const MAX_SEGMENTS: usize = u8::MAX as usize;

/// One level of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub index: u32,
    pub hardened: bool,
}

impl PathSegment {
    pub const fn hardened(index: u32) -> Self {
        Self {
            index,
            hardened: true,
        }
    }

    pub const fn normal(index: u32) -> Self {
        Self {
            index,
            hardened: false,
        }
    }

    /// Index as it goes on the wire.
    #[inline]
    pub const fn encoded(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// Ordered list of path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    segments: Vec<PathSegment>,
}

impl DerivationPath {
    /// Build a path from raw segments.
    pub fn new(segments: Vec<PathSegment>) -> CryptoResult<Self> {
        if segments.is_empty() {
            return Err(CryptoError::EmptyPath);
        }
        if segments.len() > MAX_SEGMENTS {
            return Err(CryptoError::PathTooLong(segments.len()));
        }
        if let Some(segment) = segments.iter().find(|s| s.index >= HARDENED_OFFSET) {
            return Err(CryptoError::InvalidPath(format!(
                "index {} overflows the hardened bit",
                segment.index
            )));
        }
        Ok(Self { segments })
    }

    /// `44'/501'`, the path the hardware signer uses by default.
    pub fn root() -> Self {
        Self {
            segments: vec![
                PathSegment::hardened(BIP44_PURPOSE),
                PathSegment::hardened(SOLANA_COIN_TYPE),
            ],
        }
    }

    /// The wallet's path scheme: `44'/501'`, then `account'`, then `change'`.
    ///
    /// A change index is only meaningful under an account, so `change` is
    /// ignored when `account` is `None`. The result has 2, 3 or 4 segments.
    /// Indices of 2^31 and above collide with the hardened bit and are
    /// rejected.
    pub fn solana(account: Option<u32>, change: Option<u32>) -> CryptoResult<Self> {
        let mut segments = Self::root().segments;
        if let Some(account) = account {
            segments.push(PathSegment::hardened(account));
            if let Some(change) = change {
                segments.push(PathSegment::hardened(change));
            }
        }
        Self::new(segments)
    }

    /// Path of the `index`-th locally derived wallet account: `44'/501'/index'/0'`.
    pub fn for_account(index: u32) -> CryptoResult<Self> {
        Self::solana(Some(index), Some(0))
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.segments.iter().all(|s| s.hardened)
    }

    /// Length-prefixed big-endian serialization.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(1 + self.segments.len() * 4);
        // `new` and `solana` keep the count within one byte.
        data.push(self.segments.len() as u8);
        for segment in &self.segments {
            data.extend_from_slice(&segment.encoded().to_be_bytes());
        }
        data
    }

    /// Inverse of [`DerivationPath::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let (&count, rest) = bytes
            .split_first()
            .ok_or_else(|| CryptoError::InvalidPath("missing length byte".to_string()))?;
        if rest.len() != count as usize * 4 {
            return Err(CryptoError::InvalidPath(format!(
                "expected {} segment bytes, found {}",
                count as usize * 4,
                rest.len()
            )));
        }
        let segments = rest
            .chunks_exact(4)
            .map(|chunk| {
                let raw = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                PathSegment {
                    index: raw & !HARDENED_OFFSET,
                    hardened: raw & HARDENED_OFFSET != 0,
                }
            })
            .collect();
        Self::new(segments)
    }
}

impl Default for DerivationPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        match parts.next() {
            Some("m") | Some("M") => {}
            _ => return Err(CryptoError::InvalidPath(s.to_string())),
        }

        let segments = parts
            .map(|part| {
                let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                    Some(digits) => (digits, true),
                    None => (part, false),
                };
                digits
                    .parse::<u32>()
                    .map(|index| PathSegment { index, hardened })
                    .map_err(|_| CryptoError::InvalidPath(s.to_string()))
            })
            .collect::<CryptoResult<Vec<_>>>()?;

        Self::new(segments)
    }
}
