//! Node connection settings and contract policy defaults.
//!
//! [`NodeConfig`] says where to reach the node and the block explorer.
//! [`ContractSettings`] holds the fee and hash lock policy applied by every
//! contract; it can be read from a JSON file but is never written.

use crate::error::{DscError, DscResult};
use crate::types::{MosaicId, NetworkContext, NetworkType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default maximum fee of a plain transaction, in atomic currency units.
pub const DEFAULT_TRANSACTION_FEE: u64 = 20_000;
/// Default maximum fee of an aggregate transaction, in atomic currency units.
pub const DEFAULT_AGGREGATE_FEE: u64 = 100_000;
/// Default hash lock duration in blocks (about 48 hours).
pub const DEFAULT_LOCK_DURATION: u64 = 5_760;
/// Default hash lock deposit in atomic currency units.
pub const DEFAULT_LOCK_AMOUNT: u64 = 10_000_000;
/// Default transaction lifetime in hours.
pub const DEFAULT_DEADLINE_HOURS: u64 = 2;

const DEFAULT_NODE_URL: &str = "http://localhost:3000";
const MAINNET_EXPLORER_URL: &str = "https://symbol.fyi";
const TESTNET_EXPLORER_URL: &str = "https://testnet.symbol.fyi";

/// Configuration for HTTP connection pooling.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of idle connections per host.
    /// Default: unlimited (no limit)
    pub max_idle_per_host: Option<usize>,
    /// How long to keep idle connections alive.
    /// Default: 90 seconds
    pub idle_timeout: Duration,
    /// TCP keepalive interval, if enabled.
    /// Default: 60 seconds
    pub tcp_keepalive: Option<Duration>,
    /// Whether to enable TCP nodelay (disable Nagle's algorithm).
    /// Default: true
    pub tcp_nodelay: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: None,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
            tcp_nodelay: true,
        }
    }
}

impl PoolConfig {
    /// A small pool for one-shot command line runs.
    pub fn minimal() -> Self {
        Self {
            max_idle_per_host: Some(2),
            idle_timeout: Duration::from_secs(10),
            tcp_keepalive: None,
            tcp_nodelay: true,
        }
    }
}

/// Where to reach the node and how to link to the explorer.
///
/// # Example
///
/// ```rust
/// use dsc_sdk::config::NodeConfig;
///
/// let config = NodeConfig::custom("http://localhost:3000").unwrap()
///     .with_timeout(std::time::Duration::from_secs(10));
/// assert_eq!(config.websocket_url().as_str(), "ws://localhost:3000/ws");
/// ```
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub(crate) network: NetworkType,
    pub(crate) node_url: Url,
    pub(crate) explorer_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) pool_config: PoolConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::local()
    }
}

impl NodeConfig {
    /// Public mainnet through a locally reachable node.
    pub fn mainnet() -> Self {
        Self::local().with_network(NetworkType::Mainnet)
    }

    /// Public testnet through a locally reachable node.
    pub fn testnet() -> Self {
        Self::local().with_network(NetworkType::Testnet)
    }

    /// A node on `localhost:3000`, assumed to be on testnet.
    pub fn local() -> Self {
        Self {
            network: NetworkType::Testnet,
            node_url: Url::parse(DEFAULT_NODE_URL).expect("valid default node URL"),
            explorer_url: default_explorer(NetworkType::Testnet),
            timeout: Duration::from_secs(30),
            pool_config: PoolConfig::minimal(),
        }
    }

    /// A node at `node_url`.
    pub fn custom(node_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            node_url: Url::parse(node_url)?,
            ..Self::local()
        })
    }

    /// Sets the network, which also selects the default explorer.
    pub fn with_network(mut self, network: NetworkType) -> Self {
        self.network = network;
        self.explorer_url = default_explorer(network);
        self
    }

    /// Sets the node URL.
    pub fn with_node_url(mut self, node_url: Url) -> Self {
        self.node_url = node_url;
        self
    }

    /// Sets the explorer URL.
    pub fn with_explorer_url(mut self, explorer_url: Url) -> Self {
        self.explorer_url = explorer_url;
        self
    }

    /// Sets the HTTP request and websocket handshake timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection pool configuration.
    pub fn with_pool(mut self, pool_config: PoolConfig) -> Self {
        self.pool_config = pool_config;
        self
    }

    /// The configured network.
    pub fn network(&self) -> NetworkType {
        self.network
    }

    /// REST base URL.
    pub fn node_url(&self) -> &Url {
        &self.node_url
    }

    /// Explorer base URL.
    pub fn explorer_url(&self) -> &Url {
        &self.explorer_url
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connection pool configuration.
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }

    /// Websocket endpoint: the node URL with a `ws`/`wss` scheme and `/ws`.
    pub fn websocket_url(&self) -> Url {
        let mut url = self.node_url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always an allowed scheme change
        let _ = url.set_scheme(scheme);
        let path = format!("{}/ws", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }
}

fn default_explorer(network: NetworkType) -> Url {
    let url = match network {
        NetworkType::Mainnet => MAINNET_EXPLORER_URL,
        NetworkType::Testnet => TESTNET_EXPLORER_URL,
    };
    Url::parse(url).expect("valid explorer URL")
}

/// Fee and hash lock policy shared by all contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ContractSettings {
    /// Maximum fee of a plain transaction.
    pub transaction_fee: u64,
    /// Maximum fee of an aggregate.
    pub aggregate_fee: u64,
    /// Hash lock duration in blocks.
    pub lock_duration: u64,
    /// Hash lock deposit in atomic units.
    pub lock_amount: u64,
    /// Hash lock mosaic; the network currency when unset.
    pub lock_mosaic: Option<MosaicId>,
    /// Transaction lifetime in hours.
    pub deadline_hours: u64,
}

impl Default for ContractSettings {
    fn default() -> Self {
        Self {
            transaction_fee: DEFAULT_TRANSACTION_FEE,
            aggregate_fee: DEFAULT_AGGREGATE_FEE,
            lock_duration: DEFAULT_LOCK_DURATION,
            lock_amount: DEFAULT_LOCK_AMOUNT,
            lock_mosaic: None,
            deadline_hours: DEFAULT_DEADLINE_HOURS,
        }
    }
}

impl ContractSettings {
    /// Parses settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> DscResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings no node would accept.
    pub fn validate(&self) -> DscResult<()> {
        if self.lock_duration == 0 {
            return Err(DscError::Config("lockDuration must be positive".to_string()));
        }
        if self.deadline_hours == 0 || self.deadline_hours > 24 {
            return Err(DscError::Config(
                "deadlineHours must be between 1 and 24".to_string(),
            ));
        }
        Ok(())
    }

    /// The hash lock mosaic, defaulting to the currency the node reports.
    pub fn lock_mosaic_for(&self, context: &NetworkContext) -> MosaicId {
        self.lock_mosaic.unwrap_or(context.currency_mosaic_id)
    }
}
