//! A scripted in-memory node.

use async_trait::async_trait;
use dsc_sdk::account::Account;
use dsc_sdk::api::{EventStream, ListenerEvent, NodeLookup, NodeTransport};
use dsc_sdk::broadcast::Broadcaster;
use dsc_sdk::config::ContractSettings;
use dsc_sdk::contract::ContractContext;
use dsc_sdk::crypto::Ed25519PublicKey;
use dsc_sdk::transaction::{CosignatureSignedTransaction, SignedTransaction, TransactionFactory};
use dsc_sdk::types::{Address, Hash256, NamespaceId, NetworkContext, NetworkType};
use dsc_sdk::{DscError, DscResult};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Fixed clock so transactions are reproducible.
pub const NOW_MILLIS: u64 = 1_700_000_000_000;

/// Every request the broadcaster made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Subscribe(Address),
    Announce(Hash256),
    AnnouncePartial(Hash256),
    AnnounceCosignature(Hash256),
}

/// Records calls and replies to announcements with scripted events.
pub struct MockNode {
    calls: Mutex<Vec<Call>>,
    sender: Mutex<Option<UnboundedSender<DscResult<ListenerEvent>>>>,
    receiver: Mutex<Option<UnboundedReceiver<DscResult<ListenerEvent>>>>,
    scripts: Mutex<HashMap<Hash256, Vec<ListenerEvent>>>,
    rejections: Mutex<HashMap<Hash256, (u16, String)>>,
    dropped: Mutex<HashSet<Hash256>>,
    close_after: Mutex<Option<Hash256>>,
    fail_subscribe: bool,
    auto_confirm: AtomicBool,
    subscribed: Mutex<Option<Address>>,
    announced: Mutex<Vec<SignedTransaction>>,
    namespaces: Mutex<HashSet<NamespaceId>>,
    partials: Mutex<HashSet<Hash256>>,
}

impl MockNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    /// A node whose websocket cannot be opened.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    fn build(fail_subscribe: bool) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            calls: Mutex::new(Vec::new()),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            scripts: Mutex::new(HashMap::new()),
            rejections: Mutex::new(HashMap::new()),
            dropped: Mutex::new(HashSet::new()),
            close_after: Mutex::new(None),
            fail_subscribe,
            auto_confirm: AtomicBool::new(false),
            subscribed: Mutex::new(None),
            announced: Mutex::new(Vec::new()),
            namespaces: Mutex::new(HashSet::new()),
            partials: Mutex::new(HashSet::new()),
        }
    }

    /// Emits `events` once `hash` is announced.
    pub fn on_announce(&self, hash: Hash256, events: Vec<ListenerEvent>) {
        self.scripts.lock().unwrap().entry(hash).or_default().extend(events);
    }

    /// Confirms every announced transaction and accepts every cosignature.
    pub fn confirm_everything(&self) {
        self.auto_confirm.store(true, Ordering::SeqCst);
    }

    /// Rejects the announce request for `hash` with an API error.
    pub fn reject(&self, hash: Hash256, status_code: u16, code: &str) {
        self.rejections
            .lock()
            .unwrap()
            .insert(hash, (status_code, code.to_string()));
    }

    /// Fails the announce request for `hash` before it reaches the node.
    pub fn drop_connection(&self, hash: Hash256) {
        self.dropped.lock().unwrap().insert(hash);
    }

    /// Queues an event that is delivered as soon as anyone subscribes.
    pub fn emit_now(&self, event: ListenerEvent) {
        self.push(Ok(event));
    }

    /// Ends the event stream after `hash` is announced and its script ran.
    pub fn close_after(&self, hash: Hash256) {
        *self.close_after.lock().unwrap() = Some(hash);
    }

    pub fn add_namespace(&self, id: NamespaceId) {
        self.namespaces.lock().unwrap().insert(id);
    }

    pub fn add_partial(&self, hash: Hash256) {
        self.partials.lock().unwrap().insert(hash);
    }

    /// Signed transactions in announcement order.
    pub fn announced(&self) -> Vec<SignedTransaction> {
        self.announced.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Announce requests of any kind.
    pub fn announce_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| !matches!(call, Call::Subscribe(_)))
            .count()
    }

    fn subscribed_address(&self) -> Option<Address> {
        *self.subscribed.lock().unwrap()
    }

    fn push(&self, event: DscResult<ListenerEvent>) {
        if let Some(sender) = self.sender.lock().unwrap().as_ref() {
            let _ = sender.unbounded_send(event);
        }
    }

    fn record_announce(
        &self,
        call: Call,
        hash: Hash256,
        accepted: Option<ListenerEvent>,
    ) -> DscResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.dropped.lock().unwrap().contains(&hash) {
            return Err(DscError::Connection(
                "connection reset while announcing".to_string(),
            ));
        }
        if let Some((status_code, code)) = self.rejections.lock().unwrap().get(&hash).cloned() {
            return Err(DscError::api_with_code(status_code, "rejected", Some(code)));
        }
        let script = self.scripts.lock().unwrap().remove(&hash).unwrap_or_default();
        for event in script {
            self.push(Ok(event));
        }
        if self.auto_confirm.load(Ordering::SeqCst) {
            if let Some(event) = accepted {
                self.push(Ok(event));
            }
        }
        if *self.close_after.lock().unwrap() == Some(hash) {
            self.sender.lock().unwrap().take();
        }
        Ok(())
    }
}

#[async_trait]
impl NodeTransport for MockNode {
    async fn subscribe(&self, address: &Address) -> DscResult<EventStream> {
        if self.fail_subscribe {
            return Err(DscError::Connection("connection refused".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Subscribe(*address));
        *self.subscribed.lock().unwrap() = Some(*address);
        let receiver = self
            .receiver
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| DscError::Subscription("already subscribed".to_string()))?;
        Ok(receiver.boxed())
    }

    async fn announce(&self, transaction: &SignedTransaction) -> DscResult<()> {
        self.announced.lock().unwrap().push(transaction.clone());
        let accepted = self.subscribed_address().map(|a| confirmed(a, transaction.hash()));
        self.record_announce(Call::Announce(transaction.hash()), transaction.hash(), accepted)
    }

    async fn announce_partial(&self, transaction: &SignedTransaction) -> DscResult<()> {
        self.announced.lock().unwrap().push(transaction.clone());
        let accepted = self.subscribed_address().map(|a| confirmed(a, transaction.hash()));
        self.record_announce(
            Call::AnnouncePartial(transaction.hash()),
            transaction.hash(),
            accepted,
        )
    }

    async fn announce_cosignature(
        &self,
        cosignature: &CosignatureSignedTransaction,
    ) -> DscResult<()> {
        let accepted = self.subscribed_address().map(|a| {
            cosignature_added(a, cosignature.parent_hash, cosignature.signer_public_key)
        });
        self.record_announce(
            Call::AnnounceCosignature(cosignature.parent_hash),
            cosignature.parent_hash,
            accepted,
        )
    }
}

#[async_trait]
impl NodeLookup for MockNode {
    async fn namespace_exists(&self, id: NamespaceId) -> DscResult<bool> {
        Ok(self.namespaces.lock().unwrap().contains(&id))
    }

    async fn partial_exists(&self, hash: Hash256) -> DscResult<bool> {
        Ok(self.partials.lock().unwrap().contains(&hash))
    }
}

pub fn network_context() -> NetworkContext {
    NetworkContext::new(
        NetworkType::Testnet,
        Hash256::sha3_256(b"behavioral test network"),
        1_667_250_467,
    )
}

pub fn factory() -> TransactionFactory {
    TransactionFactory::new(network_context()).at_time(NOW_MILLIS)
}

pub fn contract_context(node: &Arc<MockNode>, account: Account) -> ContractContext {
    contract_context_with(node, account, Broadcaster::new(node.clone()))
}

pub fn contract_context_with(
    node: &Arc<MockNode>,
    account: Account,
    broadcaster: Broadcaster,
) -> ContractContext {
    ContractContext::new(
        Arc::new(account),
        factory(),
        broadcaster,
        node.clone(),
        ContractSettings::default(),
    )
}

pub fn confirmed(address: Address, hash: Hash256) -> ListenerEvent {
    ListenerEvent::Confirmed { address, hash }
}

pub fn status(address: Address, hash: Hash256, code: &str) -> ListenerEvent {
    ListenerEvent::Status {
        address,
        hash,
        code: code.to_string(),
    }
}

pub fn partial_added(address: Address, hash: Hash256) -> ListenerEvent {
    ListenerEvent::PartialAdded { address, hash }
}

pub fn cosignature_added(
    address: Address,
    parent_hash: Hash256,
    signer: Ed25519PublicKey,
) -> ListenerEvent {
    ListenerEvent::CosignatureAdded {
        address,
        parent_hash,
        signer_public_key: signer,
    }
}
