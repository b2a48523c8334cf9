//! Output formatting for contract runs.

use dsc_sdk::broadcast::{BroadcastEvent, ExplorerLinks, FailureStage, Outcome};
use dsc_sdk::DscError;

/// Print a key-value pair in human-readable format.
pub fn print_kv(key: &str, value: &str) {
    println!("  {key}: {value}");
}

/// Print a section header.
pub fn print_header(title: &str) {
    println!("\n--- {title} ---");
}

/// One progress line per broadcaster notification.
pub fn print_event(event: &BroadcastEvent) {
    match event {
        BroadcastEvent::Subscribed { address } => println!("  listening for {address}"),
        BroadcastEvent::Announced { hash } => println!("  announced {hash}"),
        BroadcastEvent::LockConfirmed { hash } => {
            println!("  hash lock {hash} confirmed, announcing bonded aggregate")
        }
        BroadcastEvent::PartialAdded { hash } => {
            println!("  {hash} is waiting for cosignatures")
        }
        BroadcastEvent::CosignatureAdded { parent_hash, signer } => {
            println!("  {signer} cosigned {parent_hash}")
        }
        // Terminal events are covered by the summary.
        BroadcastEvent::Confirmed { .. }
        | BroadcastEvent::Failed { .. }
        | BroadcastEvent::Cancelled { .. } => {}
    }
}

/// Final summary with explorer or status links.
pub fn print_outcome(outcome: &Outcome, links: &ExplorerLinks) {
    print_header("Result");
    print!("{}", format_outcome(outcome, links));
}

/// Renders the summary lines of `outcome`.
pub fn format_outcome(outcome: &Outcome, links: &ExplorerLinks) -> String {
    match outcome {
        Outcome::Confirmed { hash } => format!(
            "Success: {outcome}\n  Explorer: {}\n",
            links.transaction_url(hash)
        ),
        Outcome::Failed {
            hash,
            code,
            stage: FailureStage::Ledger,
        } => format!(
            "Failure: {outcome}\n  Code: {code}\n  Status: {}\n",
            links.status_url(hash)
        ),
        Outcome::Failed { code, .. } => format!("Failure: {outcome}\n  Code: {code}\n"),
        Outcome::Cancelled { hash, .. } => format!(
            "Cancelled: {outcome}\n  Status: {}\n",
            links.status_url(hash)
        ),
    }
}

/// One-line error report. Node and SDK errors are shown with their user
/// message and a sanitized detail.
pub fn format_error(error: &anyhow::Error) -> String {
    let found = error
        .chain()
        .enumerate()
        .find_map(|(depth, cause)| cause.downcast_ref::<DscError>().map(|e| (depth, e)));
    let Some((depth, cause)) = found else {
        return format!("{error:#}");
    };
    let detail = format!("{}: {}", cause.user_message(), cause.sanitized_message());
    if depth == 0 {
        detail
    } else {
        format!("{error}: {detail}")
    }
}
