//! 32-byte hash value.
//!
//! Transaction hashes are the correlation key between an announced
//! transaction and the node events that report on it. The node renders them
//! as upper-case hex without a prefix; parsing accepts either case and an
//! optional `0x`.

use crate::error::{DscError, DscResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

/// Length of a hash in bytes.
pub const HASH_LENGTH: usize = 32;

/// A 32-byte SHA3-256 hash value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash256([u8; HASH_LENGTH]);

impl Hash256 {
    /// The all-zero hash, used as the merkle root of an empty aggregate.
    pub const ZERO: Self = Self([0u8; HASH_LENGTH]);

    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Computes the SHA3-256 hash of `data`.
    pub fn sha3_256<T: AsRef<[u8]>>(data: T) -> Self {
        Self::sha3_256_of([data])
    }

    /// Computes the SHA3-256 hash of the concatenation of `items`.
    pub fn sha3_256_of<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut hasher = Sha3_256::new();
        for item in items {
            hasher.update(item.as_ref());
        }
        Self(hasher.finalize().into())
    }

    /// Parses a hash from hex, with or without `0x`, in either case.
    pub fn from_hex<T: AsRef<str>>(hex_str: T) -> DscResult<Self> {
        let hex_str = hex_str.as_ref().trim();
        let hex_str = hex_str
            .strip_prefix("0x")
            .or_else(|| hex_str.strip_prefix("0X"))
            .unwrap_or(hex_str);

        if hex_str.len() != HASH_LENGTH * 2 {
            return Err(DscError::InvalidHash(format!(
                "expected {} hex characters, got {}",
                HASH_LENGTH * 2,
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(bytes)
    }

    /// Creates a hash from a byte slice of exactly 32 bytes.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> DscResult<Self> {
        let bytes = bytes.as_ref();
        let array: [u8; HASH_LENGTH] = bytes.try_into().map_err(|_| {
            DscError::InvalidHash(format!(
                "expected {} bytes, got {}",
                HASH_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Returns the hash as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the hash as a byte array.
    pub fn to_bytes(&self) -> [u8; HASH_LENGTH] {
        self.0
    }

    /// Upper-case hex without prefix, the form the node uses.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Returns true for the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }
}

impl Default for Hash256 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Hash256 {
    type Err = DscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl From<[u8; HASH_LENGTH]> for Hash256 {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
