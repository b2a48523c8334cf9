//! Announce, subscribe and wait for a terminal outcome.

use crate::api::{EventStream, ListenerEvent, NodeTransport};
use crate::broadcast::outcome::{BroadcastEvent, CancelReason, FailureStage, Outcome};
use crate::error::{DscError, DscResult};
use crate::transaction::{
    CosignatureSignedTransaction, SignedTransaction, TransactionBody, TransactionType,
};
use crate::types::{Address, Hash256};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Failure code of an announce request that never reached the node.
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
/// Failure code of an announce request that failed for any other local reason.
pub const SUBMISSION_ERROR: &str = "SUBMISSION_ERROR";

/// What ended a wait for the next event.
enum Next {
    Event(ListenerEvent),
    Stop(CancelReason),
}

/// Drives the announcement flows against a [`NodeTransport`].
///
/// Every flow opens the event subscription for the account before the first
/// announce request, then waits until an event correlated by hash ends it.
/// There is no wait timeout unless one is configured.
///
/// # Example
///
/// ```rust,no_run
/// use dsc_sdk::api::NodeClient;
/// use dsc_sdk::broadcast::Broadcaster;
/// use dsc_sdk::config::NodeConfig;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example() -> dsc_sdk::DscResult<()> {
/// let client = NodeClient::new(NodeConfig::testnet())?;
/// let broadcaster = Broadcaster::new(Arc::new(client))
///     .with_wait_timeout(Duration::from_secs(600));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Broadcaster {
    transport: Arc<dyn NodeTransport>,
    wait_timeout: Option<Duration>,
    cancellation: CancellationToken,
    event_sender: Option<mpsc::Sender<BroadcastEvent>>,
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("wait_timeout", &self.wait_timeout)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Broadcaster {
    /// Creates a broadcaster that waits without a deadline.
    pub fn new(transport: Arc<dyn NodeTransport>) -> Self {
        Self {
            transport,
            wait_timeout: None,
            cancellation: CancellationToken::new(),
            event_sender: None,
        }
    }

    /// Gives up waiting after `timeout`, measured from the start of each flow.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// Uses `token` to abandon pending waits.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Sends progress notifications to `sender`.
    pub fn with_event_sender(mut self, sender: mpsc::Sender<BroadcastEvent>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// The token that cancels pending waits.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Announces `transaction` and waits for its confirmation or rejection.
    ///
    /// # Errors
    ///
    /// Returns an error when the subscription cannot be opened (nothing is
    /// announced then) or when the event stream breaks while waiting. A failed
    /// announce request is a `Failed` outcome.
    pub async fn announce(
        &self,
        address: &Address,
        transaction: &SignedTransaction,
    ) -> DscResult<Outcome> {
        let hash = transaction.hash();
        let deadline = self.deadline();
        if let Some(outcome) = self.cancelled_before_start(hash) {
            return Ok(outcome);
        }

        let mut events = self.subscribe(address).await?;
        if let Some(outcome) = self
            .submit(hash, self.transport.announce(transaction).await)
            .await?
        {
            return Ok(outcome);
        }

        loop {
            let event = match self.next_event(&mut events, deadline).await? {
                Next::Event(event) => event,
                Next::Stop(reason) => return Ok(self.cancelled(hash, reason).await),
            };
            if !event.concerns(address) {
                continue;
            }
            match event {
                ListenerEvent::Confirmed { hash: h, .. } if h == hash => {
                    return Ok(self.confirmed(hash).await);
                }
                ListenerEvent::Status { hash: h, code, .. } if h == hash => {
                    return Ok(self.failed(hash, code, FailureStage::Ledger).await);
                }
                other => trace!(?other, "ignoring unrelated event"),
            }
        }
    }

    /// Announces `lock`, waits for its confirmation, then announces `bonded`
    /// and waits for the aggregate to be confirmed.
    ///
    /// Partial-cache and cosignature events for the aggregate are reported to
    /// the observer and never end the wait. If the lock fails, the aggregate
    /// is never announced.
    pub async fn announce_partial(
        &self,
        address: &Address,
        lock: &SignedTransaction,
        bonded: &SignedTransaction,
    ) -> DscResult<Outcome> {
        check_lock_pair(lock, bonded)?;
        let lock_hash = lock.hash();
        let bonded_hash = bonded.hash();
        let deadline = self.deadline();
        if let Some(outcome) = self.cancelled_before_start(lock_hash) {
            return Ok(outcome);
        }

        let mut events = self.subscribe(address).await?;
        if let Some(outcome) = self
            .submit(lock_hash, self.transport.announce(lock).await)
            .await?
        {
            return Ok(outcome);
        }

        // The bonded aggregate is only announced from inside this loop, after
        // the lock confirmation arrived.
        loop {
            let event = match self.next_event(&mut events, deadline).await? {
                Next::Event(event) => event,
                Next::Stop(reason) => return Ok(self.cancelled(lock_hash, reason).await),
            };
            if !event.concerns(address) {
                continue;
            }
            match event {
                ListenerEvent::Confirmed { hash, .. } if hash == lock_hash => {
                    info!(
                        lock_hash = %lock_hash,
                        bonded_hash = %bonded_hash,
                        "hash lock confirmed"
                    );
                    self.send_event(BroadcastEvent::LockConfirmed { hash: lock_hash }).await;
                    break;
                }
                ListenerEvent::Status { hash, code, .. } if hash == lock_hash => {
                    return Ok(self.failed(lock_hash, code, FailureStage::Ledger).await);
                }
                other => trace!(?other, "ignoring unrelated event"),
            }
        }

        if let Some(outcome) = self
            .submit(bonded_hash, self.transport.announce_partial(bonded).await)
            .await?
        {
            return Ok(outcome);
        }

        loop {
            let event = match self.next_event(&mut events, deadline).await? {
                Next::Event(event) => event,
                Next::Stop(reason) => return Ok(self.cancelled(bonded_hash, reason).await),
            };
            if !event.concerns(address) {
                continue;
            }
            match event {
                ListenerEvent::PartialAdded { hash, .. } if hash == bonded_hash => {
                    info!(hash = %bonded_hash, "bonded aggregate waiting for cosignatures");
                    self.send_event(BroadcastEvent::PartialAdded { hash }).await;
                }
                ListenerEvent::CosignatureAdded {
                    parent_hash,
                    signer_public_key,
                    ..
                } if parent_hash == bonded_hash => {
                    info!(hash = %bonded_hash, signer = %signer_public_key, "cosignature added");
                    self.send_event(BroadcastEvent::CosignatureAdded {
                        parent_hash,
                        signer: signer_public_key,
                    })
                    .await;
                }
                ListenerEvent::Confirmed { hash, .. } if hash == bonded_hash => {
                    return Ok(self.confirmed(bonded_hash).await);
                }
                ListenerEvent::Status { hash, code, .. } if hash == bonded_hash => {
                    return Ok(self.failed(bonded_hash, code, FailureStage::Ledger).await);
                }
                other => trace!(?other, "ignoring unrelated event"),
            }
        }
    }

    /// Announces a detached cosignature and waits until the node reports it
    /// added to the parent aggregate.
    ///
    /// Only a cosignature event for the same parent hash and the same signer
    /// ends the wait successfully.
    pub async fn announce_cosignature(
        &self,
        address: &Address,
        cosignature: &CosignatureSignedTransaction,
    ) -> DscResult<Outcome> {
        let parent_hash = cosignature.parent_hash;
        let deadline = self.deadline();
        if let Some(outcome) = self.cancelled_before_start(parent_hash) {
            return Ok(outcome);
        }

        let mut events = self.subscribe(address).await?;
        if let Some(outcome) = self
            .submit(
                parent_hash,
                self.transport.announce_cosignature(cosignature).await,
            )
            .await?
        {
            return Ok(outcome);
        }

        loop {
            let event = match self.next_event(&mut events, deadline).await? {
                Next::Event(event) => event,
                Next::Stop(reason) => return Ok(self.cancelled(parent_hash, reason).await),
            };
            if !event.concerns(address) {
                continue;
            }
            match event {
                ListenerEvent::CosignatureAdded {
                    parent_hash: h,
                    signer_public_key,
                    ..
                } if h == parent_hash && signer_public_key == cosignature.signer_public_key => {
                    self.send_event(BroadcastEvent::CosignatureAdded {
                        parent_hash,
                        signer: signer_public_key,
                    })
                    .await;
                    return Ok(self.confirmed(parent_hash).await);
                }
                ListenerEvent::Status { hash, code, .. } if hash == parent_hash => {
                    return Ok(self.failed(parent_hash, code, FailureStage::Ledger).await);
                }
                other => trace!(?other, "ignoring unrelated event"),
            }
        }
    }

    // === Helper Methods ===

    fn deadline(&self) -> Option<Instant> {
        self.wait_timeout.map(|timeout| Instant::now() + timeout)
    }

    fn cancelled_before_start(&self, hash: Hash256) -> Option<Outcome> {
        self.cancellation.is_cancelled().then(|| {
            debug!(%hash, "cancelled before subscribing");
            Outcome::Cancelled {
                hash,
                reason: CancelReason::Requested,
            }
        })
    }

    async fn subscribe(&self, address: &Address) -> DscResult<EventStream> {
        let events = self.transport.subscribe(address).await?;
        debug!(%address, "subscription open");
        self.send_event(BroadcastEvent::Subscribed { address: *address })
            .await;
        Ok(events)
    }

    /// Maps any failed announce request to a terminal `Failed` outcome.
    async fn submit(&self, hash: Hash256, result: DscResult<()>) -> DscResult<Option<Outcome>> {
        let code = match result {
            Ok(()) => {
                self.send_event(BroadcastEvent::Announced { hash }).await;
                return Ok(None);
            }
            Err(DscError::Api {
                status_code,
                message,
                code,
            }) => {
                warn!(%hash, status_code, %message, "announce rejected");
                code.unwrap_or_else(|| format!("HTTP_{status_code}"))
            }
            Err(e) => {
                warn!(%hash, error = %e.sanitized_message(), "announce request failed");
                submission_error_code(&e).to_string()
            }
        };
        Ok(Some(self.failed(hash, code, FailureStage::Submission).await))
    }

    async fn next_event(
        &self,
        events: &mut EventStream,
        deadline: Option<Instant>,
    ) -> DscResult<Next> {
        let timeout = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Ok(Next::Stop(CancelReason::Requested)),
            _ = timeout => Ok(Next::Stop(CancelReason::DeadlineElapsed)),
            event = events.next() => match event {
                Some(Ok(event)) => Ok(Next::Event(event)),
                Some(Err(e)) => Err(DscError::Subscription(format!("event stream failed: {e}"))),
                None => Err(DscError::Subscription(
                    "event stream ended before a final event".to_string(),
                )),
            },
        }
    }

    async fn confirmed(&self, hash: Hash256) -> Outcome {
        info!(%hash, "transaction confirmed");
        self.send_event(BroadcastEvent::Confirmed { hash }).await;
        Outcome::Confirmed { hash }
    }

    async fn failed(&self, hash: Hash256, code: String, stage: FailureStage) -> Outcome {
        warn!(%hash, %code, ?stage, "transaction failed");
        self.send_event(BroadcastEvent::Failed {
            hash,
            code: code.clone(),
        })
        .await;
        Outcome::Failed { hash, code, stage }
    }

    async fn cancelled(&self, hash: Hash256, reason: CancelReason) -> Outcome {
        info!(%hash, %reason, "stopped waiting");
        self.send_event(BroadcastEvent::Cancelled { hash, reason })
            .await;
        Outcome::Cancelled { hash, reason }
    }

    /// Send an event through the event sender if one is configured.
    async fn send_event(&self, event: BroadcastEvent) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send event");
            }
        }
    }
}

fn submission_error_code(error: &DscError) -> &'static str {
    match error {
        DscError::Http(_) | DscError::WebSocket(_) | DscError::Connection(_) => NETWORK_ERROR,
        _ => SUBMISSION_ERROR,
    }
}

fn check_lock_pair(lock: &SignedTransaction, bonded: &SignedTransaction) -> DscResult<()> {
    if bonded.transaction_type() != TransactionType::AggregateBonded {
        return Err(DscError::transaction(format!(
            "expected a bonded aggregate, got {:?}",
            bonded.transaction_type()
        )));
    }
    match &lock.transaction().body {
        TransactionBody::HashLock(body) if body.hash == bonded.hash() => Ok(()),
        TransactionBody::HashLock(body) => Err(DscError::transaction(format!(
            "hash lock references {}, not the bonded aggregate {}",
            body.hash,
            bonded.hash()
        ))),
        _ => Err(DscError::transaction("expected a hash lock transaction")),
    }
}
