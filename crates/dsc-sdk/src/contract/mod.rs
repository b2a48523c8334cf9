//! Disposable contracts.
//!
//! A contract gathers its parameters, builds its transaction set and picks
//! the announcement protocol: a set the initiator can sign alone goes out as
//! a plain transaction or a complete aggregate, a set that needs somebody
//! else's signature goes out as a bonded aggregate funded by a hash lock.
//!
//! | Contract | Protocol |
//! |---|---|
//! | `transfer` | plain transaction |
//! | `create-namespace` | complete aggregate |
//! | `create-mosaic` | complete aggregate |
//! | `escrow` | hash lock, then bonded aggregate |
//! | `request-from-friend` | hash lock, then bonded aggregate |
//! | `cosign` | detached cosignature |

mod cosign;
mod escrow;
mod mosaic;
mod namespace;
pub mod params;
mod request;
mod transfer;

pub use cosign::CosignContract;
pub use escrow::EscrowContract;
pub use mosaic::CreateMosaicContract;
pub use namespace::CreateNamespaceContract;
pub use params::{ParameterResolver, StaticResolver};
pub use request::RequestFromFriendContract;
pub use transfer::TransferContract;

use crate::api::NodeLookup;
use crate::broadcast::{Broadcaster, Outcome};
use crate::config::ContractSettings;
use crate::crypto::Ed25519PublicKey;
use crate::error::{DscError, DscResult};
use crate::transaction::{
    cosign, sign_transaction, EmbeddedTransaction, SignedTransaction, Signer, Transaction,
    TransactionFactory, TransactionKind,
};
use crate::types::{Address, Hash256, Mosaic, NetworkType};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A named, self-contained workflow ending in one announcement flow.
#[async_trait]
pub trait Contract: Send + Sync {
    /// Name used to select the contract.
    fn name(&self) -> &'static str;

    /// One-line description.
    fn description(&self) -> &'static str;

    /// Resolves parameters, builds and signs the transactions, announces them
    /// and waits for the outcome.
    ///
    /// Parameter errors are returned before anything is announced.
    async fn execute(
        &self,
        ctx: &ContractContext,
        params: &dyn ParameterResolver,
    ) -> DscResult<Outcome>;
}

/// Every contract this crate ships, in menu order.
pub fn catalogue() -> Vec<Box<dyn Contract>> {
    vec![
        Box::new(TransferContract),
        Box::new(CreateNamespaceContract),
        Box::new(CreateMosaicContract),
        Box::new(EscrowContract),
        Box::new(RequestFromFriendContract),
        Box::new(CosignContract),
    ]
}

/// Looks a contract up by name.
pub fn find(name: &str) -> Option<Box<dyn Contract>> {
    catalogue().into_iter().find(|contract| contract.name() == name)
}

/// What a contract runs with: who signs, how transactions are built, where
/// they are announced.
pub struct ContractContext {
    signer: Arc<dyn Signer>,
    factory: TransactionFactory,
    broadcaster: Broadcaster,
    lookup: Arc<dyn NodeLookup>,
    settings: ContractSettings,
}

impl fmt::Debug for ContractContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractContext")
            .field("address", &self.signer.address())
            .field("factory", &self.factory)
            .field("broadcaster", &self.broadcaster)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ContractContext {
    /// Bundles the collaborators of a contract run.
    pub fn new(
        signer: Arc<dyn Signer>,
        factory: TransactionFactory,
        broadcaster: Broadcaster,
        lookup: Arc<dyn NodeLookup>,
        settings: ContractSettings,
    ) -> Self {
        Self {
            signer,
            factory,
            broadcaster,
            lookup,
            settings,
        }
    }

    /// The initiating account.
    pub fn signer(&self) -> &dyn Signer {
        self.signer.as_ref()
    }

    /// The initiator's public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.signer.public_key()
    }

    /// The initiator's address, which is also the subscribed address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Transaction factory.
    pub fn factory(&self) -> &TransactionFactory {
        &self.factory
    }

    /// Node lookups.
    pub fn lookup(&self) -> &dyn NodeLookup {
        self.lookup.as_ref()
    }

    /// Fee and lock policy.
    pub fn settings(&self) -> &ContractSettings {
        &self.settings
    }

    /// Target network.
    pub fn network(&self) -> NetworkType {
        self.factory.network()
    }

    /// The hash lock deposit configured for this run.
    pub fn default_lock(&self) -> Mosaic {
        Mosaic::new(
            self.settings.lock_mosaic_for(self.factory.context()),
            self.settings.lock_amount,
        )
    }

    /// Signs `transaction` with the initiator's key.
    pub fn sign(&self, transaction: Transaction) -> DscResult<SignedTransaction> {
        sign_transaction(
            self.signer.as_ref(),
            transaction,
            &self.factory.context().generation_hash_seed,
        )
    }

    /// Builds, signs and announces one plain transaction.
    pub async fn announce_single(&self, kind: TransactionKind) -> DscResult<Outcome> {
        let transaction = self.factory.build(self.signer.public_key(), kind)?;
        let signed = self.sign(transaction)?;
        info!(hash = %signed.hash(), kind = ?signed.transaction_type(), "announcing transaction");
        self.broadcaster.announce(&self.address(), &signed).await
    }

    /// Packages `transactions` as complete when the initiator signs all of
    /// them and as bonded with the default lock otherwise.
    pub async fn announce_aggregate(
        &self,
        transactions: Vec<EmbeddedTransaction>,
    ) -> DscResult<Outcome> {
        let initiator = self.signer.public_key();
        if transactions
            .iter()
            .all(|t| t.signer_public_key() == initiator)
        {
            self.announce_complete(transactions).await
        } else {
            self.announce_bonded(transactions, self.default_lock()).await
        }
    }

    /// Announces `transactions` in a complete aggregate.
    pub async fn announce_complete(
        &self,
        transactions: Vec<EmbeddedTransaction>,
    ) -> DscResult<Outcome> {
        let aggregate = self
            .factory
            .aggregate_complete(self.signer.public_key(), transactions)?;
        let signed = self.sign(aggregate)?;
        info!(hash = %signed.hash(), "announcing complete aggregate");
        self.broadcaster.announce(&self.address(), &signed).await
    }

    /// Announces `transactions` in a bonded aggregate funded by a hash lock
    /// of `lock`.
    pub async fn announce_bonded(
        &self,
        transactions: Vec<EmbeddedTransaction>,
        lock: Mosaic,
    ) -> DscResult<Outcome> {
        let (signed_lock, signed_bonded) = self.prepare_bonded(transactions, lock)?;
        info!(
            lock_hash = %signed_lock.hash(),
            bonded_hash = %signed_bonded.hash(),
            "announcing hash lock and bonded aggregate"
        );
        self.broadcaster
            .announce_partial(&self.address(), &signed_lock, &signed_bonded)
            .await
    }

    /// Signs a bonded aggregate and the hash lock that funds it.
    ///
    /// Returns `(lock, bonded)`.
    pub fn prepare_bonded(
        &self,
        transactions: Vec<EmbeddedTransaction>,
        lock: Mosaic,
    ) -> DscResult<(SignedTransaction, SignedTransaction)> {
        let initiator = self.signer.public_key();
        let bonded = self.factory.aggregate_bonded(initiator, transactions)?;
        if let Some(aggregate) = bonded.aggregate() {
            let cosigners = aggregate.required_cosigners(&initiator);
            if cosigners.is_empty() {
                return Err(DscError::transaction(
                    "a bonded aggregate needs at least one other signer",
                ));
            }
            debug!(cosigners = cosigners.len(), "bonded aggregate needs cosignatures");
        }
        let signed_bonded = self.sign(bonded)?;

        let lock_transaction = self.factory.hash_lock(
            initiator,
            lock,
            self.settings.lock_duration,
            &signed_bonded,
        )?;
        let signed_lock = self.sign(lock_transaction)?;
        Ok((signed_lock, signed_bonded))
    }

    /// Cosigns the bonded aggregate `parent_hash` and waits for the node to
    /// record the cosignature.
    pub async fn announce_cosignature(&self, parent_hash: Hash256) -> DscResult<Outcome> {
        let cosignature = cosign(self.signer.as_ref(), parent_hash);
        info!(%parent_hash, "announcing cosignature");
        self.broadcaster
            .announce_cosignature(&self.address(), &cosignature)
            .await
    }
}

/// The lock deposit, with `lockMosaic` and `lockAmount` overrides applied.
pub(crate) fn resolve_lock(
    ctx: &ContractContext,
    params: &dyn ParameterResolver,
) -> DscResult<Mosaic> {
    let default = ctx.default_lock();
    let prompt = "Hash lock mosaic (empty for the network currency)";
    let mosaic = match params::resolve_optional(params, "lockMosaic", prompt)? {
        Some(value) => params::parse_mosaic_ref("lockMosaic", &value)?,
        None => default.id,
    };
    let default_amount = default.amount.to_string();
    let amount = params::resolve_parsed(
        params,
        "lockAmount",
        Some(&default_amount),
        "Hash lock deposit (atomic units)",
    )?;
    Ok(Mosaic::new(mosaic, amount))
}

/// The network currency as a parameter default.
pub(crate) fn currency_default(ctx: &ContractContext) -> String {
    format!("0x{}", ctx.factory().context().currency_mosaic_id)
}
