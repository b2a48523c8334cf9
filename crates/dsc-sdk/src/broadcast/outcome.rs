//! Terminal outcomes and progress notifications.

use crate::crypto::Ed25519PublicKey;
use crate::types::{Address, Hash256};
use std::fmt;

/// Which step produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// The node refused the announce request.
    Submission,
    /// The transaction was accepted and later rejected, reported on the status channel.
    Ledger,
}

/// Why a wait was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The cancellation token was triggered.
    Requested,
    /// The configured wait timeout elapsed.
    DeadlineElapsed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("cancelled"),
            Self::DeadlineElapsed => f.write_str("wait timeout elapsed"),
        }
    }
}

/// How an announcement flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The transaction was included in a block.
    Confirmed {
        /// Confirmed transaction hash.
        hash: Hash256,
    },
    /// The transaction was rejected.
    Failed {
        /// Rejected transaction hash.
        hash: Hash256,
        /// Node or ledger error code.
        code: String,
        /// Where the rejection happened.
        stage: FailureStage,
    },
    /// The wait ended before a terminal event.
    Cancelled {
        /// Hash that was being waited for.
        hash: Hash256,
        /// Why the wait ended.
        reason: CancelReason,
    },
}

impl Outcome {
    /// Only a confirmation counts as success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Process exit code: 0 confirmed, 1 failed, 130 cancelled.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Confirmed { .. } => 0,
            Self::Failed { .. } => 1,
            Self::Cancelled { .. } => 130,
        }
    }

    /// The hash the outcome refers to.
    pub fn hash(&self) -> Hash256 {
        match self {
            Self::Confirmed { hash } | Self::Failed { hash, .. } | Self::Cancelled { hash, .. } => {
                *hash
            }
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed { hash } => write!(f, "transaction {hash} confirmed"),
            Self::Failed {
                hash,
                code,
                stage: FailureStage::Submission,
            } => write!(f, "announce of {hash} rejected: {code}"),
            Self::Failed {
                hash,
                code,
                stage: FailureStage::Ledger,
            } => write!(f, "transaction {hash} failed: {code}"),
            Self::Cancelled { hash, reason } => write!(f, "waiting for {hash}: {reason}"),
        }
    }
}

/// Progress notifications sent to an optional observer channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastEvent {
    /// The event subscription is open.
    Subscribed {
        /// Subscribed address.
        address: Address,
    },
    /// The node accepted an announce request.
    Announced {
        /// Announced hash.
        hash: Hash256,
    },
    /// The hash lock was confirmed and the bonded aggregate is about to be announced.
    LockConfirmed {
        /// Hash lock transaction hash.
        hash: Hash256,
    },
    /// The bonded aggregate reached the partial cache.
    PartialAdded {
        /// Bonded aggregate hash.
        hash: Hash256,
    },
    /// A cosignature was added to the bonded aggregate.
    CosignatureAdded {
        /// Bonded aggregate hash.
        parent_hash: Hash256,
        /// Cosigner.
        signer: Ed25519PublicKey,
    },
    /// Terminal success.
    Confirmed {
        /// Confirmed hash.
        hash: Hash256,
    },
    /// Terminal failure.
    Failed {
        /// Rejected hash.
        hash: Hash256,
        /// Error code.
        code: String,
    },
    /// The wait was abandoned.
    Cancelled {
        /// Hash that was being waited for.
        hash: Hash256,
        /// Why.
        reason: CancelReason,
    },
}
