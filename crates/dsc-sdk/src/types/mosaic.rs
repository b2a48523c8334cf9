//! Mosaic and namespace identifiers.

use crate::error::{DscError, DscResult};
use crate::types::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

const NAMESPACE_FLAG: u64 = 1 << 63;
const MAX_NAMESPACE_PART_LENGTH: usize = 64;
const MAX_NAMESPACE_DEPTH: usize = 3;

fn parse_id(s: &str) -> Option<u64> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let cleaned: String = s.chars().filter(|c| *c != '\'').collect();
    if cleaned.is_empty() || cleaned.len() > 16 {
        return None;
    }
    u64::from_str_radix(&cleaned, 16).ok()
}

fn first_u64(digest: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $err:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier.
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier.
            pub const fn value(self) -> u64 {
                self.0
            }

            /// Sixteen upper-case hex digits, the form used in node URLs.
            pub fn to_hex(self) -> String {
                format!("{:016X}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = DscError;

            /// Accepts an optional `0x` prefix and `'` digit separators.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_id(s).map(Self).ok_or_else(|| $err(s.to_string()))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

id_type!(
    /// Identifier of a mosaic definition.
    MosaicId,
    DscError::InvalidMosaicId
);

id_type!(
    /// Identifier of a registered namespace.
    NamespaceId,
    DscError::InvalidNamespace
);

id_type!(
    /// A mosaic reference that is either a mosaic id or a namespace alias.
    UnresolvedMosaicId,
    DscError::InvalidMosaicId
);

impl MosaicId {
    /// Derives the id of the mosaic `owner` defines with `nonce`.
    pub fn from_nonce(owner: &Address, nonce: u32) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(nonce.to_le_bytes());
        hasher.update(owner.as_bytes());
        Self(first_u64(&hasher.finalize()) & !NAMESPACE_FLAG)
    }
}

impl NamespaceId {
    /// Derives the id of `name` registered under `parent`, or at the root.
    pub fn from_name(name: &str, parent: Option<NamespaceId>) -> DscResult<Self> {
        validate_namespace_part(name)?;
        let parent = parent.map_or(0, NamespaceId::value);

        let mut hasher = Sha3_256::new();
        hasher.update((parent as u32).to_le_bytes());
        hasher.update(((parent >> 32) as u32).to_le_bytes());
        hasher.update(name.as_bytes());
        Ok(Self(first_u64(&hasher.finalize()) | NAMESPACE_FLAG))
    }

    /// Ids of every level of a dotted path, root first.
    pub fn path(full_name: &str) -> DscResult<Vec<NamespaceId>> {
        let parts: Vec<&str> = full_name.split('.').collect();
        if parts.len() > MAX_NAMESPACE_DEPTH {
            return Err(DscError::InvalidNamespace(format!(
                "'{full_name}' has more than {MAX_NAMESPACE_DEPTH} levels"
            )));
        }

        let mut ids = Vec::with_capacity(parts.len());
        let mut parent = None;
        for part in parts {
            let id = NamespaceId::from_name(part, parent)?;
            ids.push(id);
            parent = Some(id);
        }
        Ok(ids)
    }

    /// Id of the last level of a dotted path.
    pub fn from_full_name(full_name: &str) -> DscResult<Self> {
        Self::path(full_name)?
            .pop()
            .ok_or_else(|| DscError::InvalidNamespace("empty namespace name".to_string()))
    }
}

/// Validates a single namespace level.
pub fn validate_namespace_part(part: &str) -> DscResult<()> {
    if part.is_empty() || part.len() > MAX_NAMESPACE_PART_LENGTH {
        return Err(DscError::InvalidNamespace(format!(
            "'{part}' must be between 1 and {MAX_NAMESPACE_PART_LENGTH} characters"
        )));
    }
    let mut chars = part.chars();
    let starts_alphanumeric = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let rest_valid = part
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !starts_alphanumeric || !rest_valid {
        return Err(DscError::InvalidNamespace(format!(
            "'{part}' may only contain a-z, 0-9, '_' and '-', and must start with a letter or digit"
        )));
    }
    Ok(())
}

impl From<MosaicId> for UnresolvedMosaicId {
    fn from(id: MosaicId) -> Self {
        Self(id.0)
    }
}

impl From<NamespaceId> for UnresolvedMosaicId {
    fn from(id: NamespaceId) -> Self {
        Self(id.0)
    }
}

impl UnresolvedMosaicId {
    /// True when the reference is a namespace alias rather than a mosaic id.
    pub fn is_alias(self) -> bool {
        self.0 & NAMESPACE_FLAG != 0
    }
}

/// An amount of a mosaic, in atomic units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mosaic {
    /// Mosaic or alias being moved.
    pub id: UnresolvedMosaicId,
    /// Amount in atomic units.
    pub amount: u64,
}

impl Mosaic {
    /// Creates a mosaic amount.
    pub fn new(id: impl Into<UnresolvedMosaicId>, amount: u64) -> Self {
        Self {
            id: id.into(),
            amount,
        }
    }
}

/// Properties fixed at mosaic definition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MosaicFlags {
    /// The owner may change the supply later.
    pub supply_mutable: bool,
    /// Holders other than the owner may transfer the mosaic.
    pub transferable: bool,
    /// Transfers may be restricted by mosaic restrictions.
    pub restrictable: bool,
    /// The owner may revoke balances.
    pub revokable: bool,
}

impl MosaicFlags {
    /// Packs the flags into their wire byte.
    pub fn bits(self) -> u8 {
        u8::from(self.supply_mutable)
            | u8::from(self.transferable) << 1
            | u8::from(self.restrictable) << 2
            | u8::from(self.revokable) << 3
    }
}
