//! Network identity and per-run network parameters.

use crate::error::{DscError, DscResult};
use crate::types::{Hash256, MosaicId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

const MILLIS_PER_HOUR: u64 = 60 * 60 * 1000;

/// Known networks, identified by the byte embedded in addresses and
/// transaction headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Public main network
    Mainnet,
    /// Public test network
    Testnet,
}

impl NetworkType {
    /// Returns the identifier byte for this network.
    pub const fn as_byte(self) -> u8 {
        match self {
            NetworkType::Mainnet => 0x68,
            NetworkType::Testnet => 0x98,
        }
    }

    /// Looks up a network by its identifier byte.
    pub fn from_byte(byte: u8) -> DscResult<Self> {
        match byte {
            0x68 => Ok(NetworkType::Mainnet),
            0x98 => Ok(NetworkType::Testnet),
            other => Err(DscError::Config(format!(
                "unknown network identifier byte 0x{other:02X}"
            ))),
        }
    }

    /// Returns the network name as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
        }
    }

    /// The network currency mosaic, used as the default hash lock deposit.
    pub fn currency_mosaic_id(self) -> MosaicId {
        match self {
            NetworkType::Mainnet => MosaicId::new(0x6BED_913F_A202_23F8),
            NetworkType::Testnet => MosaicId::new(0x72C0_212E_67A0_8BCE),
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = DscError;

    /// Accepts the names reported by `/network/properties`, old and new.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "public" => Ok(NetworkType::Mainnet),
            "testnet" | "public_test" | "public-test" => Ok(NetworkType::Testnet),
            other => Err(DscError::Config(format!("unknown network '{other}'"))),
        }
    }
}

/// Network parameters every transaction depends on, fetched once per run and
/// passed explicitly to the factory and the signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    /// Network the node belongs to.
    pub network_type: NetworkType,
    /// Seed prepended to every signing payload.
    pub generation_hash_seed: Hash256,
    /// Seconds between the Unix epoch and the network epoch.
    pub epoch_adjustment: u64,
    /// The network currency mosaic.
    pub currency_mosaic_id: MosaicId,
}

impl NetworkContext {
    /// Builds a context with the network's well-known currency mosaic.
    pub fn new(
        network_type: NetworkType,
        generation_hash_seed: Hash256,
        epoch_adjustment: u64,
    ) -> Self {
        Self {
            network_type,
            generation_hash_seed,
            epoch_adjustment,
            currency_mosaic_id: network_type.currency_mosaic_id(),
        }
    }

    /// Overrides the currency mosaic reported by the node.
    pub fn with_currency_mosaic(mut self, currency_mosaic_id: MosaicId) -> Self {
        self.currency_mosaic_id = currency_mosaic_id;
        self
    }

    /// Converts a Unix timestamp in milliseconds to network time.
    pub fn network_time(&self, unix_millis: u64) -> u64 {
        unix_millis.saturating_sub(self.epoch_adjustment * 1000)
    }

    /// Deadline `hours` after `unix_millis`, in network time.
    pub fn deadline_at(&self, unix_millis: u64, hours: u64) -> u64 {
        self.network_time(unix_millis) + hours * MILLIS_PER_HOUR
    }

    /// Deadline `hours` from now, in network time.
    pub fn deadline(&self, hours: u64) -> u64 {
        self.deadline_at(now_millis(), hours)
    }
}

/// Current Unix time in milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
