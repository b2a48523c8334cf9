//! # Disposable smart contracts
//!
//! Short-lived ledger workflows ("contracts") that build a transaction set,
//! sign it, announce it to a node and wait for the network to confirm or
//! reject it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dsc_sdk::account::Account;
//! use dsc_sdk::api::NodeClient;
//! use dsc_sdk::broadcast::Broadcaster;
//! use dsc_sdk::config::{ContractSettings, NodeConfig};
//! use dsc_sdk::contract::{self, ContractContext, StaticResolver};
//! use dsc_sdk::transaction::TransactionFactory;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(NodeClient::new(NodeConfig::testnet())?);
//!     let context = client.network_context().await?;
//!
//!     let account = Account::from_private_key_hex("...", context.network_type)?;
//!     let settings = ContractSettings::default();
//!     let ctx = ContractContext::new(
//!         Arc::new(account),
//!         TransactionFactory::from_settings(context, &settings),
//!         Broadcaster::new(client.clone()),
//!         client,
//!         settings,
//!     );
//!
//!     let params = StaticResolver::new()
//!         .with("recipient", "TBDSKA3DSLPDRVKVNRLFJ5PXLE4NLKAQXFJZGKQ")
//!         .with("amount", "1000000");
//!     let transfer = contract::find("transfer").expect("transfer contract");
//!     let outcome = transfer.execute(&ctx, &params).await?;
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Addresses, hashes, mosaic and namespace ids, network context
//! - [`crypto`] - Ed25519 keys and the aggregate merkle root
//! - [`account`] - Key pairs bound to a network address
//! - [`transaction`] - Factory, binary codec and signing
//! - [`api`] - Node REST client and websocket listener
//! - [`broadcast`] - Announce, subscribe and wait for an [`Outcome`](broadcast::Outcome)
//! - [`contract`] - The contract catalogue and its orchestration
//! - [`config`] - Node settings and fee and lock policy

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod account;
pub mod api;
pub mod broadcast;
pub mod config;
pub mod contract;
pub mod crypto;
pub mod error;
pub mod transaction;
pub mod types;

pub use config::NodeConfig;
pub use error::{DscError, DscResult};

pub use types::{Address, Hash256, NetworkType};
