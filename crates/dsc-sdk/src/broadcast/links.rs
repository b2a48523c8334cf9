//! Human-facing links for announced transactions.

use crate::config::NodeConfig;
use crate::types::Hash256;
use url::Url;

/// Builds explorer and node status links.
#[derive(Debug, Clone)]
pub struct ExplorerLinks {
    explorer: Url,
    node: Url,
}

impl ExplorerLinks {
    /// Links for the explorer and node in `config`.
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            explorer: config.explorer_url().clone(),
            node: config.node_url().clone(),
        }
    }

    /// `{explorer}/transactions/{hash}`
    pub fn transaction_url(&self, hash: &Hash256) -> String {
        format!("{}/transactions/{hash}", self.explorer.as_str().trim_end_matches('/'))
    }

    /// `{node}/transactionStatus/{hash}`
    pub fn status_url(&self, hash: &Hash256) -> String {
        format!("{}/transactionStatus/{hash}", self.node.as_str().trim_end_matches('/'))
    }
}
