//! Transaction value objects.
//!
//! Unsigned transactions are produced once by the
//! [`TransactionFactory`](super::TransactionFactory) and never mutated.
//! Signing turns them into a [`SignedTransaction`] whose hash is computed at
//! that moment and reused as the correlation key for node events.

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::error::{DscError, DscResult};
use crate::types::{
    Address, Hash256, Mosaic, MosaicFlags, MosaicId, NamespaceId, NetworkType, UnresolvedMosaicId,
};
use std::fmt;

/// Maximum number of mosaics a transfer may carry.
pub const MAX_TRANSFER_MOSAICS: usize = u8::MAX as usize;
/// Maximum encoded message length of a transfer, including its type byte.
pub const MAX_MESSAGE_LENGTH: usize = 1024;
/// Maximum number of transactions embedded in one aggregate.
pub const MAX_AGGREGATE_TRANSACTIONS: usize = 100;

/// Ledger transaction types with their wire codes and versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Moves mosaics and/or a message to a recipient.
    Transfer,
    /// Registers a root or child namespace.
    NamespaceRegistration,
    /// Defines a new mosaic.
    MosaicDefinition,
    /// Increases or decreases a mosaic's supply.
    MosaicSupplyChange,
    /// Links or unlinks a namespace and a mosaic.
    MosaicAlias,
    /// Deposits funds for a pending bonded aggregate.
    HashLock,
    /// Aggregate fully signed by its participants.
    AggregateComplete,
    /// Aggregate waiting for cosignatures.
    AggregateBonded,
}

impl TransactionType {
    /// Wire code.
    pub const fn code(self) -> u16 {
        match self {
            TransactionType::Transfer => 0x4154,
            TransactionType::NamespaceRegistration => 0x414E,
            TransactionType::MosaicDefinition => 0x414D,
            TransactionType::MosaicSupplyChange => 0x424D,
            TransactionType::MosaicAlias => 0x434E,
            TransactionType::HashLock => 0x4148,
            TransactionType::AggregateComplete => 0x4141,
            TransactionType::AggregateBonded => 0x4241,
        }
    }

    /// Wire version.
    pub const fn version(self) -> u8 {
        match self {
            TransactionType::AggregateComplete | TransactionType::AggregateBonded => 2,
            _ => 1,
        }
    }

    /// Looks up a type by its wire code.
    pub fn from_code(code: u16) -> DscResult<Self> {
        [
            TransactionType::Transfer,
            TransactionType::NamespaceRegistration,
            TransactionType::MosaicDefinition,
            TransactionType::MosaicSupplyChange,
            TransactionType::MosaicAlias,
            TransactionType::HashLock,
            TransactionType::AggregateComplete,
            TransactionType::AggregateBonded,
        ]
        .into_iter()
        .find(|ty| ty.code() == code)
        .ok_or_else(|| DscError::transaction(format!("unknown transaction type 0x{code:04X}")))
    }

    /// True for both aggregate kinds.
    pub const fn is_aggregate(self) -> bool {
        matches!(
            self,
            TransactionType::AggregateComplete | TransactionType::AggregateBonded
        )
    }
}

/// Transfer of mosaics and an optional plain message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferBody {
    /// Receiving account.
    pub recipient: Address,
    /// Mosaics moved; sorted by id on the wire.
    pub mosaics: Vec<Mosaic>,
    /// Plain-text message, if any.
    pub message: Option<String>,
}

impl TransferBody {
    /// Encoded message: a zero type byte followed by the UTF-8 text.
    pub fn message_bytes(&self) -> Vec<u8> {
        match &self.message {
            Some(text) => {
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.push(0);
                bytes.extend_from_slice(text.as_bytes());
                bytes
            }
            None => Vec::new(),
        }
    }
}

/// Where a namespace is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceRegistration {
    /// Top-level namespace rented for `duration` blocks.
    Root {
        /// Rental duration in blocks.
        duration: u64,
    },
    /// Sub-namespace of an existing namespace.
    Child {
        /// The parent namespace.
        parent_id: NamespaceId,
    },
}

/// Namespace registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRegistrationBody {
    /// Id derived from the name and parent.
    pub id: NamespaceId,
    /// Single-level name.
    pub name: String,
    /// Root or child registration.
    pub registration: NamespaceRegistration,
}

/// Mosaic definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicDefinitionBody {
    /// Id derived from the owner and nonce.
    pub id: MosaicId,
    /// Duration in blocks; zero means eternal.
    pub duration: u64,
    /// Nonce used to derive the id.
    pub nonce: u32,
    /// Mosaic properties.
    pub flags: MosaicFlags,
    /// Number of decimal places.
    pub divisibility: u8,
}

/// Direction of a supply change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyChangeAction {
    /// Burn supply.
    Decrease,
    /// Mint supply.
    Increase,
}

impl SupplyChangeAction {
    pub(crate) fn as_byte(self) -> u8 {
        match self {
            SupplyChangeAction::Decrease => 0,
            SupplyChangeAction::Increase => 1,
        }
    }
}

/// Mosaic supply change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicSupplyChangeBody {
    /// Affected mosaic.
    pub mosaic_id: UnresolvedMosaicId,
    /// Amount in atomic units.
    pub delta: u64,
    /// Increase or decrease.
    pub action: SupplyChangeAction,
}

/// Alias link direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasAction {
    /// Remove the alias.
    Unlink,
    /// Create the alias.
    Link,
}

impl AliasAction {
    pub(crate) fn as_byte(self) -> u8 {
        match self {
            AliasAction::Unlink => 0,
            AliasAction::Link => 1,
        }
    }
}

/// Mosaic alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicAliasBody {
    /// Namespace used as the alias.
    pub namespace_id: NamespaceId,
    /// Mosaic being aliased.
    pub mosaic_id: MosaicId,
    /// Link or unlink.
    pub action: AliasAction,
}

/// Hash lock deposit for a bonded aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashLockBody {
    /// Deposit.
    pub mosaic: Mosaic,
    /// Lock duration in blocks.
    pub duration: u64,
    /// Hash of the bonded aggregate being funded.
    pub hash: Hash256,
}

/// Complete or bonded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// Signed by every participant up front.
    Complete,
    /// Waiting for cosignatures from other parties.
    Bonded,
}

/// Aggregate envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateBody {
    /// Complete or bonded.
    pub kind: AggregateKind,
    /// Inner transactions, in execution order.
    pub transactions: Vec<EmbeddedTransaction>,
    /// Cosignatures attached at announcement time.
    pub cosignatures: Vec<Cosignature>,
}

impl AggregateBody {
    /// Distinct signers other than `initiator` whose cosignature is required.
    pub fn required_cosigners(&self, initiator: &Ed25519PublicKey) -> Vec<Ed25519PublicKey> {
        let mut cosigners: Vec<Ed25519PublicKey> = Vec::new();
        for transaction in &self.transactions {
            let signer = transaction.signer_public_key();
            if signer != *initiator && !cosigners.contains(&signer) {
                cosigners.push(signer);
            }
        }
        cosigners
    }
}

/// Type-specific part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionBody {
    /// See [`TransferBody`].
    Transfer(TransferBody),
    /// See [`NamespaceRegistrationBody`].
    NamespaceRegistration(NamespaceRegistrationBody),
    /// See [`MosaicDefinitionBody`].
    MosaicDefinition(MosaicDefinitionBody),
    /// See [`MosaicSupplyChangeBody`].
    MosaicSupplyChange(MosaicSupplyChangeBody),
    /// See [`MosaicAliasBody`].
    MosaicAlias(MosaicAliasBody),
    /// See [`HashLockBody`].
    HashLock(HashLockBody),
    /// See [`AggregateBody`].
    Aggregate(AggregateBody),
}

impl TransactionBody {
    /// The wire type of this body.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionBody::Transfer(_) => TransactionType::Transfer,
            TransactionBody::NamespaceRegistration(_) => TransactionType::NamespaceRegistration,
            TransactionBody::MosaicDefinition(_) => TransactionType::MosaicDefinition,
            TransactionBody::MosaicSupplyChange(_) => TransactionType::MosaicSupplyChange,
            TransactionBody::MosaicAlias(_) => TransactionType::MosaicAlias,
            TransactionBody::HashLock(_) => TransactionType::HashLock,
            TransactionBody::Aggregate(aggregate) => match aggregate.kind {
                AggregateKind::Complete => TransactionType::AggregateComplete,
                AggregateKind::Bonded => TransactionType::AggregateBonded,
            },
        }
    }

    /// Checks the limits the wire format imposes.
    pub fn validate(&self) -> DscResult<()> {
        match self {
            TransactionBody::Transfer(transfer) => {
                if transfer.mosaics.len() > MAX_TRANSFER_MOSAICS {
                    return Err(DscError::transaction(format!(
                        "a transfer carries at most {MAX_TRANSFER_MOSAICS} mosaics"
                    )));
                }
                if transfer.message_bytes().len() > MAX_MESSAGE_LENGTH {
                    return Err(DscError::transaction(format!(
                        "message longer than {MAX_MESSAGE_LENGTH} bytes"
                    )));
                }
                let mut ids: Vec<u64> = transfer.mosaics.iter().map(|m| m.id.value()).collect();
                ids.sort_unstable();
                ids.dedup();
                if ids.len() != transfer.mosaics.len() {
                    return Err(DscError::transaction("duplicate mosaic in transfer"));
                }
                Ok(())
            }
            TransactionBody::NamespaceRegistration(registration) => {
                crate::types::validate_namespace_part(&registration.name)
            }
            TransactionBody::MosaicDefinition(definition) => {
                if definition.divisibility > 6 {
                    return Err(DscError::transaction("divisibility must be between 0 and 6"));
                }
                Ok(())
            }
            TransactionBody::MosaicSupplyChange(_)
            | TransactionBody::MosaicAlias(_)
            | TransactionBody::HashLock(_) => Ok(()),
            TransactionBody::Aggregate(aggregate) => {
                if aggregate.transactions.is_empty() {
                    return Err(DscError::transaction("aggregate without inner transactions"));
                }
                if aggregate.transactions.len() > MAX_AGGREGATE_TRANSACTIONS {
                    return Err(DscError::transaction(format!(
                        "an aggregate holds at most {MAX_AGGREGATE_TRANSACTIONS} transactions"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// A transaction embedded in an aggregate. It has a signer but no fee,
/// deadline or signature of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedTransaction {
    signer_public_key: Ed25519PublicKey,
    network: NetworkType,
    body: TransactionBody,
}

impl EmbeddedTransaction {
    /// Wraps a body for inclusion in an aggregate. Aggregates and hash locks
    /// cannot be embedded.
    pub fn new(
        signer_public_key: Ed25519PublicKey,
        network: NetworkType,
        body: TransactionBody,
    ) -> DscResult<Self> {
        match body {
            TransactionBody::Aggregate(_) | TransactionBody::HashLock(_) => {
                Err(DscError::transaction(format!(
                    "{:?} transactions cannot be embedded",
                    body.transaction_type()
                )))
            }
            body => {
                body.validate()?;
                Ok(Self {
                    signer_public_key,
                    network,
                    body,
                })
            }
        }
    }

    /// The inner transaction's signer.
    pub fn signer_public_key(&self) -> Ed25519PublicKey {
        self.signer_public_key
    }

    /// Network byte of the inner transaction.
    pub fn network(&self) -> NetworkType {
        self.network
    }

    /// Type-specific body.
    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    /// Wire type.
    pub fn transaction_type(&self) -> TransactionType {
        self.body.transaction_type()
    }
}

/// An unsigned top-level transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Account that signs and pays for the transaction.
    pub signer_public_key: Ed25519PublicKey,
    /// Network the transaction is valid on.
    pub network: NetworkType,
    /// Maximum fee in atomic units of the currency mosaic.
    pub max_fee: u64,
    /// Deadline in network time (milliseconds).
    pub deadline: u64,
    /// Type-specific body.
    pub body: TransactionBody,
}

impl Transaction {
    /// Wire type.
    pub fn transaction_type(&self) -> TransactionType {
        self.body.transaction_type()
    }

    /// The aggregate body, if this is an aggregate.
    pub fn aggregate(&self) -> Option<&AggregateBody> {
        match &self.body {
            TransactionBody::Aggregate(aggregate) => Some(aggregate),
            _ => None,
        }
    }
}

/// A cosignature attached to an aggregate's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cosignature {
    /// Cosignature format version, currently zero.
    pub version: u64,
    /// Cosigner.
    pub signer_public_key: Ed25519PublicKey,
    /// Signature over the aggregate hash.
    pub signature: Ed25519Signature,
}

/// A signed transaction ready for announcement.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: Transaction,
    signature: Ed25519Signature,
    hash: Hash256,
    payload: Vec<u8>,
}

impl SignedTransaction {
    pub(crate) fn new(
        transaction: Transaction,
        signature: Ed25519Signature,
        hash: Hash256,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            transaction,
            signature,
            hash,
            payload,
        }
    }

    /// Hash computed when the transaction was signed.
    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    /// The unsigned transaction.
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Signer's signature.
    pub fn signature(&self) -> Ed25519Signature {
        self.signature
    }

    /// Wire type.
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction.transaction_type()
    }

    /// Serialized transaction bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Upper-case hex of the payload, as announced to the node.
    pub fn payload_hex(&self) -> String {
        hex::encode_upper(&self.payload)
    }
}

impl fmt::Debug for SignedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedTransaction")
            .field("type", &self.transaction_type())
            .field("hash", &self.hash)
            .field("signer", &self.transaction.signer_public_key)
            .finish()
    }
}

/// A detached cosignature for a bonded aggregate already known to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CosignatureSignedTransaction {
    /// Hash of the bonded aggregate being cosigned.
    pub parent_hash: Hash256,
    /// Cosigner.
    pub signer_public_key: Ed25519PublicKey,
    /// Signature over `parent_hash`.
    pub signature: Ed25519Signature,
    /// Cosignature format version, currently zero.
    pub version: u64,
}

impl CosignatureSignedTransaction {
    /// Checks the signature against the parent hash.
    pub fn verify(&self) -> DscResult<()> {
        self.signer_public_key
            .verify(self.parent_hash.as_bytes(), &self.signature)
    }

    /// The attached form of this cosignature.
    pub fn to_cosignature(&self) -> Cosignature {
        Cosignature {
            version: self.version,
            signer_public_key: self.signer_public_key,
            signature: self.signature,
        }
    }
}
