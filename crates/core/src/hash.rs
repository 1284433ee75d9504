//! Blake3 hashing for content addressing and commitments.
//!
//! One hash function, one digest width, everywhere: trie nodes, stored
//! values and block headers are all addressed or committed by the same
//! 256-bit Blake3 digest, so roots can be compared across components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 256-bit digest as a raw byte array.
pub type H256 = [u8; 32];

/// A wrapper type for H256 with hex formatting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hash(pub H256);

impl Hash {
    /// The zero hash. Denotes "empty" wherever a sentinel is needed,
    /// e.g. the root of a trie with no entries.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash from raw bytes.
    pub fn from_bytes(bytes: H256) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &H256 {
        &self.0
    }

    /// True for the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x{})", &self.to_hex()[..8])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl From<H256> for Hash {
    fn from(bytes: H256) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for H256 {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hash arbitrary bytes with Blake3.
pub fn hash(data: &[u8]) -> Hash {
    Hash(blake3::hash(data).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let h1 = hash(b"ledger");
        let h2 = hash(b"ledger");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_hash_distinguishes_inputs() {
        assert_ne!(hash(b"a"), hash(b"b"));
    }

    #[test]
    fn test_hex_roundtrip() {
        let h = hash(b"roundtrip");
        assert_eq!(Hash::from_hex(&h.to_hex()).unwrap(), h);
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert!(Hash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_zero_hash() {
        assert!(Hash::ZERO.is_zero());
        assert!(!hash(b"x").is_zero());
    }

    #[test]
    fn test_display_format() {
        let h = hash(b"display");
        let s = format!("{}", h);
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 66);
    }
}
