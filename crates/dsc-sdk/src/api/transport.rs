//! The seam between announcement flows and the node.

use crate::api::listener::{EventStream, Listener};
use crate::api::rest::{NodeLookup, RestClient};
use crate::config::NodeConfig;
use crate::error::DscResult;
use crate::transaction::{CosignatureSignedTransaction, SignedTransaction};
use crate::types::{Address, Hash256, NamespaceId, NetworkContext};
use async_trait::async_trait;
use tracing::info;

/// Everything a broadcaster needs from a node.
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// Opens an event subscription for `address`.
    ///
    /// Must complete before anything is announced for that address, so no
    /// event can be missed.
    async fn subscribe(&self, address: &Address) -> DscResult<EventStream>;

    /// Announces a signed transaction.
    async fn announce(&self, transaction: &SignedTransaction) -> DscResult<()>;

    /// Announces a bonded aggregate.
    async fn announce_partial(&self, transaction: &SignedTransaction) -> DscResult<()>;

    /// Announces a detached cosignature.
    async fn announce_cosignature(
        &self,
        cosignature: &CosignatureSignedTransaction,
    ) -> DscResult<()>;
}

/// A node reached over REST and websocket.
#[derive(Debug, Clone)]
pub struct NodeClient {
    rest: RestClient,
}

impl NodeClient {
    /// Creates a client for the node in `config`.
    pub fn new(config: NodeConfig) -> DscResult<Self> {
        Ok(Self {
            rest: RestClient::new(config)?,
        })
    }

    /// The REST half of the client.
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Fetches the network parameters for this run.
    pub async fn network_context(&self) -> DscResult<NetworkContext> {
        self.rest.network_context().await
    }
}

#[async_trait]
impl NodeTransport for NodeClient {
    async fn subscribe(&self, address: &Address) -> DscResult<EventStream> {
        let config = self.rest.config();
        let listener = Listener::connect(&config.websocket_url(), config.timeout()).await?;
        listener.subscribe(address).await
    }

    async fn announce(&self, transaction: &SignedTransaction) -> DscResult<()> {
        let response = self.rest.announce(transaction).await?;
        info!(hash = %transaction.hash(), message = %response.message, "transaction announced");
        Ok(())
    }

    async fn announce_partial(&self, transaction: &SignedTransaction) -> DscResult<()> {
        let response = self.rest.announce_partial(transaction).await?;
        info!(
            hash = %transaction.hash(),
            message = %response.message,
            "bonded aggregate announced"
        );
        Ok(())
    }

    async fn announce_cosignature(
        &self,
        cosignature: &CosignatureSignedTransaction,
    ) -> DscResult<()> {
        let response = self.rest.announce_cosignature(cosignature).await?;
        info!(
            parent_hash = %cosignature.parent_hash,
            message = %response.message,
            "cosignature announced"
        );
        Ok(())
    }
}

#[async_trait]
impl NodeLookup for NodeClient {
    async fn namespace_exists(&self, id: NamespaceId) -> DscResult<bool> {
        self.rest.namespace_exists(id).await
    }

    async fn partial_exists(&self, hash: Hash256) -> DscResult<bool> {
        self.rest.partial_exists(hash).await
    }
}
