//! Node REST API client.

use crate::api::response::{AnnounceResponse, CosignatureRequest, NetworkProperties, PayloadRequest};
use crate::config::NodeConfig;
use crate::error::{DscError, DscResult};
use crate::transaction::{CosignatureSignedTransaction, SignedTransaction};
use crate::types::{Hash256, NamespaceId, NetworkContext};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Read-only node queries contracts need before announcing anything.
#[async_trait]
pub trait NodeLookup: Send + Sync {
    /// Whether a namespace with this id is registered.
    async fn namespace_exists(&self, id: NamespaceId) -> DscResult<bool>;

    /// Whether a bonded aggregate with this hash is waiting for cosignatures.
    async fn partial_exists(&self, hash: Hash256) -> DscResult<bool>;
}

/// Client for the node REST API.
///
/// There is no retry layer: every call is attempted once and failures are
/// reported to the caller as they are.
#[derive(Debug, Clone)]
pub struct RestClient {
    config: NodeConfig,
    client: Client,
}

impl RestClient {
    /// Creates a new REST client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: NodeConfig) -> DscResult<Self> {
        let pool = config.pool_config();

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(pool.max_idle_per_host.unwrap_or(usize::MAX))
            .pool_idle_timeout(pool.idle_timeout)
            .tcp_nodelay(pool.tcp_nodelay);

        if let Some(keepalive) = pool.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        let client = builder.build().map_err(DscError::Http)?;
        Ok(Self { config, client })
    }

    /// Returns the base URL of the node.
    pub fn base_url(&self) -> &Url {
        self.config.node_url()
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Gets the network properties.
    pub async fn network_properties(&self) -> DscResult<NetworkProperties> {
        self.get_json(self.build_url("network/properties")).await
    }

    /// Fetches the network parameters for this run.
    ///
    /// # Errors
    ///
    /// A node that cannot be reached is reported as [`DscError::Connection`].
    pub async fn network_context(&self) -> DscResult<NetworkContext> {
        let properties = self.network_properties().await.map_err(|e| match e {
            DscError::Http(err) if err.is_connect() || err.is_timeout() => DscError::Connection(
                format!("could not reach node at {}: {err}", self.base_url()),
            ),
            other => other,
        })?;
        properties.to_context()
    }

    /// Announces a signed transaction (`PUT /transactions`).
    pub async fn announce(&self, transaction: &SignedTransaction) -> DscResult<AnnounceResponse> {
        debug!(hash = %transaction.hash(), "PUT /transactions");
        self.put_json(self.build_url("transactions"), &PayloadRequest::from(transaction))
            .await
    }

    /// Announces a bonded aggregate (`PUT /transactions/partial`).
    pub async fn announce_partial(
        &self,
        transaction: &SignedTransaction,
    ) -> DscResult<AnnounceResponse> {
        debug!(hash = %transaction.hash(), "PUT /transactions/partial");
        self.put_json(
            self.build_url("transactions/partial"),
            &PayloadRequest::from(transaction),
        )
        .await
    }

    /// Announces a detached cosignature (`PUT /transactions/cosignature`).
    pub async fn announce_cosignature(
        &self,
        cosignature: &CosignatureSignedTransaction,
    ) -> DscResult<AnnounceResponse> {
        debug!(parent_hash = %cosignature.parent_hash, "PUT /transactions/cosignature");
        self.put_json(
            self.build_url("transactions/cosignature"),
            &CosignatureRequest::from(cosignature),
        )
        .await
    }

    async fn exists(&self, url: Url) -> DscResult<bool> {
        match self.get_json::<serde_json::Value>(url).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    // === Helper Methods ===

    fn build_url(&self, path: &str) -> Url {
        let mut url = self.config.node_url().clone();
        if !path.is_empty() {
            if !url.path().ends_with('/') {
                url.set_path(&format!("{}/", url.path()));
            }
            url.set_path(&format!("{}{}", url.path(), path));
        }
        url
    }

    async fn get_json<T: for<'de> serde::Deserialize<'de>>(&self, url: Url) -> DscResult<T> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn put_json<B: Serialize + ?Sized, T: for<'de> serde::Deserialize<'de> + Default>(
        &self,
        url: Url,
        body: &B,
    ) -> DscResult<T> {
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .json(body)
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(T::default());
        }
        Self::handle_response(response).await
    }

    async fn handle_response<T: for<'de> serde::Deserialize<'de>>(
        response: reqwest::Response,
    ) -> DscResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let code = body
            .get("code")
            .and_then(|v| v.as_str())
            .map(ToString::to_string);

        Err(DscError::api_with_code(status.as_u16(), message, code))
    }
}

#[async_trait]
impl NodeLookup for RestClient {
    async fn namespace_exists(&self, id: NamespaceId) -> DscResult<bool> {
        self.exists(self.build_url(&format!("namespaces/{id}"))).await
    }

    async fn partial_exists(&self, hash: Hash256) -> DscResult<bool> {
        self.exists(self.build_url(&format!("transactions/partial/{hash}")))
            .await
    }
}
