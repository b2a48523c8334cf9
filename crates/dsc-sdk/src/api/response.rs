//! Request and response bodies of the node REST API.

use crate::error::{DscError, DscResult};
use crate::transaction::{CosignatureSignedTransaction, SignedTransaction};
use crate::types::{Hash256, MosaicId, NetworkContext, NetworkType};
use serde::{Deserialize, Serialize};

/// `GET /network/properties`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkProperties {
    /// Network section.
    pub network: NetworkSection,
    /// Chain section, absent on some node versions.
    #[serde(default)]
    pub chain: Option<ChainSection>,
}

/// Network section of the network properties.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSection {
    /// Network name, for example `testnet`.
    pub identifier: String,
    /// Epoch adjustment with a unit suffix, for example `1667250467s`.
    #[serde(default)]
    pub epoch_adjustment: Option<String>,
    /// Generation hash seed.
    #[serde(default)]
    pub generation_hash_seed: Option<String>,
}

/// Chain section of the network properties.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSection {
    /// Currency mosaic id, for example `0x72C0'212E'67A0'8BCE`.
    #[serde(default)]
    pub currency_mosaic_id: Option<String>,
}

impl NetworkProperties {
    /// Extracts the parameters transactions are built and signed with.
    pub fn to_context(&self) -> DscResult<NetworkContext> {
        let network_type: NetworkType = self.network.identifier.parse()?;

        let seed = self
            .network
            .generation_hash_seed
            .as_deref()
            .ok_or_else(|| missing("generation hash seed"))?;
        let generation_hash_seed = Hash256::from_hex(seed)?;

        let epoch = self
            .network
            .epoch_adjustment
            .as_deref()
            .ok_or_else(|| missing("epoch adjustment"))?;
        let epoch_adjustment = parse_seconds(epoch)?;

        let mut context = NetworkContext::new(network_type, generation_hash_seed, epoch_adjustment);
        if let Some(currency) = self
            .chain
            .as_ref()
            .and_then(|chain| chain.currency_mosaic_id.as_deref())
        {
            context = context.with_currency_mosaic(currency.parse::<MosaicId>()?);
        }
        Ok(context)
    }
}

fn parse_seconds(value: &str) -> DscResult<u64> {
    let digits = value.trim().trim_end_matches('s');
    let cleaned: String = digits.chars().filter(|c| *c != '\'').collect();
    cleaned
        .parse()
        .map_err(|_| DscError::Connection(format!("unexpected epoch adjustment '{value}'")))
}

fn missing(field: &str) -> DscError {
    DscError::Connection(format!("node did not report the {field}"))
}

/// Body of the announce endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadRequest {
    /// Upper-case hex of the serialized transaction.
    pub payload: String,
}

impl From<&SignedTransaction> for PayloadRequest {
    fn from(transaction: &SignedTransaction) -> Self {
        Self {
            payload: transaction.payload_hex(),
        }
    }
}

/// Body of `PUT /transactions/cosignature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignatureRequest {
    /// Cosignature version as a decimal string.
    pub version: String,
    /// Cosigner public key.
    pub signer_public_key: String,
    /// Signature over the parent hash.
    pub signature: String,
    /// Bonded aggregate hash.
    pub parent_hash: String,
}

impl From<&CosignatureSignedTransaction> for CosignatureRequest {
    fn from(cosignature: &CosignatureSignedTransaction) -> Self {
        Self {
            version: cosignature.version.to_string(),
            signer_public_key: cosignature.signer_public_key.to_hex(),
            signature: cosignature.signature.to_hex(),
            parent_hash: cosignature.parent_hash.to_hex(),
        }
    }
}

/// Acknowledgement returned with `202 Accepted`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnounceResponse {
    /// Human readable acknowledgement.
    #[serde(default)]
    pub message: String,
}
