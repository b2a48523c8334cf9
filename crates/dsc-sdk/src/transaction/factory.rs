//! Deterministic construction of unsigned transactions.
//!
//! A [`TransactionFactory`] is built from an explicit [`NetworkContext`] and
//! fee policy. Given the same parameters and clock it always produces the same
//! transaction.

use crate::api::NodeLookup;
use crate::config::ContractSettings;
use crate::crypto::Ed25519PublicKey;
use crate::error::{DscError, DscResult};
use crate::transaction::types::{
    AggregateBody, AggregateKind, AliasAction, EmbeddedTransaction, HashLockBody,
    MosaicAliasBody, MosaicDefinitionBody, MosaicSupplyChangeBody, NamespaceRegistration,
    NamespaceRegistrationBody, SignedTransaction, SupplyChangeAction, Transaction,
    TransactionBody, TransactionType, TransferBody,
};
use crate::types::{
    now_millis, Address, Hash256, Mosaic, MosaicFlags, MosaicId, NamespaceId, NetworkContext,
    NetworkType, UnresolvedMosaicId,
};
use tracing::debug;

/// Business-level description of a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    /// Send mosaics and/or a message.
    Transfer {
        /// Receiving account.
        recipient: Address,
        /// Mosaics to send.
        mosaics: Vec<Mosaic>,
        /// Optional plain message.
        message: Option<String>,
    },
    /// Register a top-level namespace.
    RootNamespace {
        /// Single-level name.
        name: String,
        /// Rental duration in blocks.
        duration: u64,
    },
    /// Register a namespace under an existing one.
    ChildNamespace {
        /// Single-level name.
        name: String,
        /// Parent namespace.
        parent: NamespaceId,
    },
    /// Define a mosaic owned by the signer.
    MosaicDefinition {
        /// Nonce from which the id is derived.
        nonce: u32,
        /// Mosaic properties.
        flags: MosaicFlags,
        /// Decimal places.
        divisibility: u8,
        /// Duration in blocks; zero means eternal.
        duration: u64,
    },
    /// Change the supply of a mosaic.
    MosaicSupplyChange {
        /// Affected mosaic.
        mosaic_id: UnresolvedMosaicId,
        /// Increase or decrease.
        action: SupplyChangeAction,
        /// Amount in atomic units.
        delta: u64,
    },
    /// Link or unlink a namespace to a mosaic.
    MosaicAlias {
        /// Alias namespace.
        namespace_id: NamespaceId,
        /// Target mosaic.
        mosaic_id: MosaicId,
        /// Link or unlink.
        action: AliasAction,
    },
    /// Lock funds for a bonded aggregate.
    HashLock {
        /// Deposit.
        mosaic: Mosaic,
        /// Lock duration in blocks.
        duration: u64,
        /// Bonded aggregate hash.
        hash: Hash256,
    },
}

/// Builds unsigned transactions for one network.
#[derive(Debug, Clone)]
pub struct TransactionFactory {
    context: NetworkContext,
    transaction_fee: u64,
    aggregate_fee: u64,
    deadline_hours: u64,
    fixed_time: Option<u64>,
}

impl TransactionFactory {
    /// Creates a factory with the default fee policy.
    pub fn new(context: NetworkContext) -> Self {
        Self::from_settings(context, &ContractSettings::default())
    }

    /// Creates a factory using the fees and deadline from `settings`.
    pub fn from_settings(context: NetworkContext, settings: &ContractSettings) -> Self {
        Self {
            context,
            transaction_fee: settings.transaction_fee,
            aggregate_fee: settings.aggregate_fee,
            deadline_hours: settings.deadline_hours,
            fixed_time: None,
        }
    }

    /// Sets the maximum fees of plain and aggregate transactions.
    pub fn with_fees(mut self, transaction_fee: u64, aggregate_fee: u64) -> Self {
        self.transaction_fee = transaction_fee;
        self.aggregate_fee = aggregate_fee;
        self
    }

    /// Sets how many hours after creation transactions expire.
    pub fn with_deadline_hours(mut self, hours: u64) -> Self {
        self.deadline_hours = hours;
        self
    }

    /// Pins the clock used for deadlines to `unix_millis`.
    pub fn at_time(mut self, unix_millis: u64) -> Self {
        self.fixed_time = Some(unix_millis);
        self
    }

    /// The network parameters this factory builds for.
    pub fn context(&self) -> &NetworkContext {
        &self.context
    }

    /// The target network.
    pub fn network(&self) -> NetworkType {
        self.context.network_type
    }

    /// Deadline for transactions built now.
    pub fn deadline(&self) -> u64 {
        let now = self.fixed_time.unwrap_or_else(now_millis);
        self.context.deadline_at(now, self.deadline_hours)
    }

    /// Builds the body for `kind`, signed by `signer`.
    pub fn body(
        &self,
        signer: &Ed25519PublicKey,
        kind: TransactionKind,
    ) -> DscResult<TransactionBody> {
        let body = match kind {
            TransactionKind::Transfer {
                recipient,
                mosaics,
                message,
            } => {
                if recipient.network() != self.network() {
                    return Err(DscError::InvalidAddress(format!(
                        "{recipient} does not belong to {}",
                        self.network()
                    )));
                }
                TransactionBody::Transfer(TransferBody {
                    recipient,
                    mosaics,
                    message,
                })
            }
            TransactionKind::RootNamespace { name, duration } => {
                TransactionBody::NamespaceRegistration(NamespaceRegistrationBody {
                    id: NamespaceId::from_name(&name, None)?,
                    name,
                    registration: NamespaceRegistration::Root { duration },
                })
            }
            TransactionKind::ChildNamespace { name, parent } => {
                TransactionBody::NamespaceRegistration(NamespaceRegistrationBody {
                    id: NamespaceId::from_name(&name, Some(parent))?,
                    name,
                    registration: NamespaceRegistration::Child { parent_id: parent },
                })
            }
            TransactionKind::MosaicDefinition {
                nonce,
                flags,
                divisibility,
                duration,
            } => {
                let owner = Address::from_public_key(&signer.to_bytes(), self.network());
                TransactionBody::MosaicDefinition(MosaicDefinitionBody {
                    id: MosaicId::from_nonce(&owner, nonce),
                    duration,
                    nonce,
                    flags,
                    divisibility,
                })
            }
            TransactionKind::MosaicSupplyChange {
                mosaic_id,
                action,
                delta,
            } => TransactionBody::MosaicSupplyChange(MosaicSupplyChangeBody {
                mosaic_id,
                delta,
                action,
            }),
            TransactionKind::MosaicAlias {
                namespace_id,
                mosaic_id,
                action,
            } => TransactionBody::MosaicAlias(MosaicAliasBody {
                namespace_id,
                mosaic_id,
                action,
            }),
            TransactionKind::HashLock {
                mosaic,
                duration,
                hash,
            } => TransactionBody::HashLock(HashLockBody {
                mosaic,
                duration,
                hash,
            }),
        };
        body.validate()?;
        Ok(body)
    }

    /// Builds a top-level transaction.
    pub fn build(&self, signer: Ed25519PublicKey, kind: TransactionKind) -> DscResult<Transaction> {
        let body = self.body(&signer, kind)?;
        Ok(self.wrap(signer, body, self.transaction_fee))
    }

    /// Builds a transaction for inclusion in an aggregate.
    pub fn embed(
        &self,
        signer: Ed25519PublicKey,
        kind: TransactionKind,
    ) -> DscResult<EmbeddedTransaction> {
        let body = self.body(&signer, kind)?;
        EmbeddedTransaction::new(signer, self.network(), body)
    }

    /// Wraps `transactions` in an aggregate signed by `signer`.
    pub fn aggregate(
        &self,
        signer: Ed25519PublicKey,
        kind: AggregateKind,
        transactions: Vec<EmbeddedTransaction>,
    ) -> DscResult<Transaction> {
        if let Some(foreign) = transactions.iter().find(|t| t.network() != self.network()) {
            return Err(DscError::transaction(format!(
                "embedded transaction targets {} instead of {}",
                foreign.network(),
                self.network()
            )));
        }
        let body = TransactionBody::Aggregate(AggregateBody {
            kind,
            transactions,
            cosignatures: Vec::new(),
        });
        body.validate()?;
        Ok(self.wrap(signer, body, self.aggregate_fee))
    }

    /// Aggregate that needs no further signatures.
    pub fn aggregate_complete(
        &self,
        signer: Ed25519PublicKey,
        transactions: Vec<EmbeddedTransaction>,
    ) -> DscResult<Transaction> {
        self.aggregate(signer, AggregateKind::Complete, transactions)
    }

    /// Aggregate that waits for cosignatures.
    pub fn aggregate_bonded(
        &self,
        signer: Ed25519PublicKey,
        transactions: Vec<EmbeddedTransaction>,
    ) -> DscResult<Transaction> {
        self.aggregate(signer, AggregateKind::Bonded, transactions)
    }

    /// Hash lock funding the signed bonded aggregate `bonded`.
    pub fn hash_lock(
        &self,
        signer: Ed25519PublicKey,
        mosaic: Mosaic,
        duration: u64,
        bonded: &SignedTransaction,
    ) -> DscResult<Transaction> {
        if bonded.transaction_type() != TransactionType::AggregateBonded {
            return Err(DscError::transaction(
                "hash locks can only fund bonded aggregates",
            ));
        }
        self.build(
            signer,
            TransactionKind::HashLock {
                mosaic,
                duration,
                hash: bonded.hash(),
            },
        )
    }

    /// Namespace registration for `full_name` after checking with the node
    /// that it is still free. A dotted name registers its last level under
    /// an existing parent.
    pub async fn namespace_registration_checked(
        &self,
        lookup: &dyn NodeLookup,
        signer: Ed25519PublicKey,
        full_name: &str,
        duration: u64,
    ) -> DscResult<EmbeddedTransaction> {
        let path = NamespaceId::path(full_name)?;
        let (id, parent) = match path.as_slice() {
            [] => return Err(DscError::InvalidNamespace("empty namespace name".to_string())),
            [.., parent, id] => (*id, Some(*parent)),
            [id] => (*id, None),
        };

        if lookup.namespace_exists(id).await? {
            return Err(DscError::InvalidNamespace(format!(
                "namespace '{full_name}' ({id}) is already registered"
            )));
        }
        debug!(namespace = full_name, id = %id, "Namespace is available");

        let name = full_name.rsplit('.').next().unwrap_or(full_name).to_string();
        let kind = match parent {
            Some(parent) => {
                if !lookup.namespace_exists(parent).await? {
                    return Err(DscError::InvalidNamespace(format!(
                        "parent namespace of '{full_name}' ({parent}) does not exist"
                    )));
                }
                TransactionKind::ChildNamespace { name, parent }
            }
            None => TransactionKind::RootNamespace { name, duration },
        };
        self.embed(signer, kind)
    }

    fn wrap(&self, signer: Ed25519PublicKey, body: TransactionBody, max_fee: u64) -> Transaction {
        Transaction {
            signer_public_key: signer,
            network: self.network(),
            max_fee,
            deadline: self.deadline(),
            body,
        }
    }
}
