//! Transaction building, serialization and signing.
//!
//! - [`TransactionFactory`] turns business parameters into unsigned transactions
//! - [`codec`] lays them out in the ledger's binary format
//! - [`sign_transaction`] and [`cosign`] produce what gets announced

pub mod codec;
mod factory;
mod signer;
mod types;

pub use factory::{TransactionFactory, TransactionKind};
pub use signer::{cosign, sign_transaction, verify_transaction, Signer};
pub use types::{
    AggregateBody, AggregateKind, AliasAction, Cosignature, CosignatureSignedTransaction,
    EmbeddedTransaction, HashLockBody, MosaicAliasBody, MosaicDefinitionBody,
    MosaicSupplyChangeBody, NamespaceRegistration, NamespaceRegistrationBody, SignedTransaction,
    SupplyChangeAction, Transaction, TransactionBody, TransactionType, TransferBody,
    MAX_AGGREGATE_TRANSACTIONS, MAX_MESSAGE_LENGTH, MAX_TRANSFER_MOSAICS,
};
