//! Account addresses.
//!
//! An address is 24 bytes: the network byte, the RIPEMD-160 digest of the
//! SHA3-256 hash of the public key, and a three byte checksum. Its textual
//! form is unpadded base32 (39 characters).

use crate::error::{DscError, DscResult};
use crate::types::NetworkType;
use data_encoding::BASE32_NOPAD;
use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

/// Length of a decoded address in bytes.
pub const ADDRESS_LENGTH: usize = 24;
/// Length of an encoded address in characters.
pub const ENCODED_ADDRESS_LENGTH: usize = 39;

const CHECKSUM_LENGTH: usize = 3;
const RIPEMD_LENGTH: usize = 20;

/// A network-specific account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Derives the address of `public_key` on `network`.
    pub fn from_public_key(public_key: &[u8; 32], network: NetworkType) -> Self {
        let key_hash = Sha3_256::digest(public_key);
        let ripemd = Ripemd160::digest(key_hash);

        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[0] = network.as_byte();
        bytes[1..=RIPEMD_LENGTH].copy_from_slice(&ripemd);
        let checksum = Sha3_256::digest(&bytes[..=RIPEMD_LENGTH]);
        bytes[RIPEMD_LENGTH + 1..].copy_from_slice(&checksum[..CHECKSUM_LENGTH]);
        Self(bytes)
    }

    /// Creates an address from raw bytes, validating network byte and checksum.
    pub fn from_bytes(bytes: &[u8]) -> DscResult<Self> {
        let bytes: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
            DscError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LENGTH,
                bytes.len()
            ))
        })?;

        NetworkType::from_byte(bytes[0]).map_err(|_| {
            DscError::InvalidAddress(format!("unknown network byte 0x{:02X}", bytes[0]))
        })?;

        let checksum = Sha3_256::digest(&bytes[..=RIPEMD_LENGTH]);
        if checksum[..CHECKSUM_LENGTH] != bytes[RIPEMD_LENGTH + 1..] {
            return Err(DscError::InvalidAddress("checksum mismatch".to_string()));
        }
        Ok(Self(bytes))
    }

    /// Parses the base32 form. Dashes (the pretty-printed form) are ignored.
    pub fn from_encoded(encoded: &str) -> DscResult<Self> {
        let normalized: String = encoded
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.len() != ENCODED_ADDRESS_LENGTH {
            return Err(DscError::InvalidAddress(format!(
                "expected {} characters, got {}",
                ENCODED_ADDRESS_LENGTH,
                normalized.len()
            )));
        }

        let bytes = BASE32_NOPAD
            .decode(normalized.as_bytes())
            .map_err(|e| DscError::InvalidAddress(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the network this address belongs to.
    pub fn network(&self) -> NetworkType {
        // from_bytes and from_public_key only accept known network bytes
        NetworkType::from_byte(self.0[0]).unwrap_or(NetworkType::Mainnet)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns the unpadded base32 form.
    pub fn encoded(&self) -> String {
        BASE32_NOPAD.encode(&self.0)
    }

    /// Returns the base32 form split into six-character groups.
    pub fn pretty(&self) -> String {
        let encoded = self.encoded();
        encoded
            .as_bytes()
            .chunks(6)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encoded())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded())
    }
}

impl FromStr for Address {
    type Err = DscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_encoded(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_encoded(&s).map_err(serde::de::Error::custom)
    }
}
