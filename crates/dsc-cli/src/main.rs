//! `dsc` - run a disposable smart contract against a node.
//!
//! A run picks one contract from the catalogue, collects its parameters,
//! announces the resulting transactions and waits for the network to decide.
//! The exit code mirrors the outcome: 0 confirmed, 1 failed, 130 cancelled.

mod common;
mod config;
mod output;
mod prompt;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use common::{check_network, load_account, parse_key_value, GlobalOpts};
use config::CliConfig;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use dsc_sdk::api::NodeClient;
use dsc_sdk::broadcast::{Broadcaster, ExplorerLinks, Outcome};
use dsc_sdk::contract::{self, Contract, ContractContext, ParameterResolver, StaticResolver};
use dsc_sdk::transaction::TransactionFactory;
use prompt::PromptResolver;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Disposable smart contracts - build, announce and track one-shot ledger workflows.
#[derive(Parser, Debug)]
#[command(name = "dsc", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Contract to run (asked interactively when omitted)
    pub contract: Option<String>,

    /// Contract parameter, repeatable
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// List the available contracts and exit
    #[arg(long, default_value_t = false)]
    pub list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    if cli.list {
        for contract in contract::catalogue() {
            println!("{:<22}{}", contract.name(), contract.description());
        }
        return Ok(());
    }

    match run(cli).await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` wins; otherwise `--debug` selects debug output for the SDK.
fn init_tracing(debug: bool) {
    let fallback = if debug { "dsc_sdk=debug,dsc=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<Outcome> {
    let file = CliConfig::load(cli.global.config.as_deref())?;
    let interactive = !cli.global.non_interactive;
    let contract = select_contract(cli.contract.as_deref(), interactive)?;

    let config = cli.global.build_config(&file, None)?;
    let client =
        Arc::new(NodeClient::new(config.clone()).context("failed to create node client")?);
    let context = client
        .network_context()
        .await
        .with_context(|| format!("cannot reach node at {}", config.node_url()))?;
    check_network(cli.global.requested_network(&file), context.network_type)
        .with_context(|| format!("node at {} is on the wrong network", config.node_url()))?;
    let config = cli.global.build_config(&file, Some(context.network_type))?;
    let links = ExplorerLinks::new(&config);

    let mut values = StaticResolver::from(file.params.clone());
    for (key, value) in &cli.params {
        values = values.with(key.as_str(), value.as_str());
    }
    if let Some(key) = cli.global.private_key.as_deref() {
        if values.get("privateKey").is_none() {
            values = values.with("privateKey", key);
        }
    }
    let resolver = PromptResolver::new(values, interactive);
    let private_key = resolver.resolve_secret("privateKey", "Private key")?;
    let account = load_account(&private_key, context.network_type)?;

    output::print_header(contract.name());
    output::print_kv("Node", config.node_url().as_str());
    output::print_kv("Network", &context.network_type.to_string());
    output::print_kv("Signer", &account.address().to_string());

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            on_interrupt.cancel();
        }
    });

    let (sender, mut receiver) = mpsc::channel(32);
    let progress = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            output::print_event(&event);
        }
    });

    let mut broadcaster = Broadcaster::new(client.clone())
        .with_cancellation(cancellation)
        .with_event_sender(sender);
    if let Some(timeout) = cli.global.wait_timeout() {
        broadcaster = broadcaster.with_wait_timeout(timeout);
    }

    let settings = file.settings;
    let ctx = ContractContext::new(
        Arc::new(account),
        TransactionFactory::from_settings(context, &settings),
        broadcaster,
        client,
        settings,
    );

    let outcome = contract
        .execute(&ctx, &resolver)
        .await
        .with_context(|| format!("{} did not complete", contract.name()))?;

    // Closing the last sender lets the progress task drain and finish.
    drop(ctx);
    let _ = progress.await;

    output::print_outcome(&outcome, &links);
    Ok(outcome)
}

fn select_contract(name: Option<&str>, interactive: bool) -> Result<Box<dyn Contract>> {
    if let Some(name) = name {
        return contract::find(name).ok_or_else(|| {
            let known: Vec<_> = contract::catalogue().iter().map(|c| c.name()).collect();
            anyhow!("unknown contract '{name}' (available: {})", known.join(", "))
        });
    }
    if !interactive {
        anyhow::bail!("no contract given; pass one of the names shown by --list");
    }

    let mut catalogue = contract::catalogue();
    let items: Vec<String> = catalogue
        .iter()
        .map(|c| format!("{:<22}{}", c.name(), c.description()))
        .collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Contract")
        .items(&items)
        .default(0)
        .interact()
        .context("no contract selected")?;
    Ok(catalogue.swap_remove(index))
}
