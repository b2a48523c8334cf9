//! Optional JSON run configuration passed with `--config`.
//!
//! The file is only read. It can pin the node and explorer, override the
//! fee and lock policy, and pre-fill contract parameters:
//!
//! ```json
//! {
//!   "nodeUrl": "http://localhost:3000",
//!   "network": "testnet",
//!   "settings": { "lockAmount": 10000000 },
//!   "params": { "recipient": "TB..." }
//! }
//! ```

use anyhow::{Context, Result};
use dsc_sdk::config::ContractSettings;
use dsc_sdk::types::NetworkType;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Contents of a run configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CliConfig {
    /// Node REST URL.
    pub node_url: Option<String>,
    /// Block explorer URL.
    pub explorer_url: Option<String>,
    /// Expected network.
    pub network: Option<NetworkType>,
    /// Fee and hash lock policy.
    pub settings: ContractSettings,
    /// Contract parameter values.
    pub params: HashMap<String, String>,
}

impl CliConfig {
    /// Loads `path`, or the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parses and validates a configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CliConfig = serde_json::from_str(json)?;
        config.settings.validate()?;
        Ok(config)
    }
}
