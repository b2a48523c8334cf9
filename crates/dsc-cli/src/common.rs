//! Shared options and helpers for the CLI.

use crate::config::CliConfig;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use dsc_sdk::account::Account;
use dsc_sdk::config::NodeConfig;
use dsc_sdk::types::NetworkType;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Options that apply to every contract.
#[derive(clap::Args, Debug)]
pub struct GlobalOpts {
    /// Node REST URL [default: http://localhost:3000]
    #[arg(long, env = "DSC_NODE_URL")]
    pub node_url: Option<String>,

    /// Block explorer URL (defaults to the network's public explorer)
    #[arg(long)]
    pub explorer_url: Option<String>,

    /// Network the node is expected to serve
    #[arg(long, value_enum)]
    pub network: Option<NetworkArg>,

    /// JSON file with node settings, lock policy and parameter values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Signing key; prefer the environment variable over the flag
    #[arg(long, env = "DSC_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Verbose logging to stderr
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Fail on missing parameters instead of prompting
    #[arg(long, default_value_t = false)]
    pub non_interactive: bool,

    /// Give up waiting for the outcome after this many seconds
    #[arg(long, value_name = "SECS")]
    pub wait_timeout: Option<u64>,
}

/// Supported network names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NetworkArg {
    Mainnet,
    Testnet,
}

impl From<NetworkArg> for NetworkType {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Mainnet => NetworkType::Mainnet,
            NetworkArg::Testnet => NetworkType::Testnet,
        }
    }
}

impl GlobalOpts {
    /// The network chosen on the command line or in the config file.
    pub fn requested_network(&self, file: &CliConfig) -> Option<NetworkType> {
        self.network.map(NetworkType::from).or(file.network)
    }

    /// Build a `NodeConfig`. Flags win over the config file; `reported` is
    /// the network the node announced, used when none was requested.
    pub fn build_config(
        &self,
        file: &CliConfig,
        reported: Option<NetworkType>,
    ) -> Result<NodeConfig> {
        let mut config = match self.node_url.as_deref().or(file.node_url.as_deref()) {
            Some(url) => NodeConfig::custom(url).context("invalid node URL")?,
            None => NodeConfig::local(),
        };

        if let Some(network) = self.requested_network(file).or(reported) {
            config = config.with_network(network);
        }

        if let Some(url) = self.explorer_url.as_deref().or(file.explorer_url.as_deref()) {
            config = config.with_explorer_url(Url::parse(url).context("invalid explorer URL")?);
        }

        Ok(config)
    }

    /// The optional wait deadline.
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout.map(Duration::from_secs)
    }
}

/// Refuse to continue when the node serves another network than the one requested.
pub fn check_network(requested: Option<NetworkType>, reported: NetworkType) -> Result<()> {
    match requested {
        Some(requested) if requested != reported => {
            bail!("node serves {reported}, not the requested {requested}")
        }
        _ => Ok(()),
    }
}

/// Parse a `key=value` contract parameter.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("parameter name cannot be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

/// Load an account from a private key hex string.
///
/// Error messages are sanitized to never include the private key material.
pub fn load_account(private_key_hex: &str, network: NetworkType) -> Result<Account> {
    let trimmed = private_key_hex.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex_str.is_empty() {
        bail!("no private key provided");
    }
    Account::from_private_key_hex(hex_str, network)
        .map_err(|_| anyhow::anyhow!("invalid private key (expected 64 hex characters)"))
}
