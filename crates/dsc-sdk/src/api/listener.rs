//! Websocket event listener.
//!
//! The node pushes one JSON message per event on `/ws`. The first message
//! carries a `uid` that has to be echoed in every subscription request.
//! Subscriptions are per channel and per address: `confirmedAdded/<ADDRESS>`.

use crate::crypto::Ed25519PublicKey;
use crate::error::{DscError, DscResult};
use crate::types::{Address, Hash256};
use futures::stream::BoxStream;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};
use url::Url;

/// Channel announcing transactions included in a block.
pub const CONFIRMED_ADDED: &str = "confirmedAdded";
/// Channel announcing bonded aggregates accepted into the partial cache.
pub const PARTIAL_ADDED: &str = "partialAdded";
/// Channel announcing cosignatures added to a partial aggregate.
pub const COSIGNATURE: &str = "cosignature";
/// Channel announcing rejected transactions.
pub const STATUS: &str = "status";

const CHANNELS: [&str; 4] = [CONFIRMED_ADDED, PARTIAL_ADDED, COSIGNATURE, STATUS];

/// Stream of events for one subscribed address.
pub type EventStream = BoxStream<'static, DscResult<ListenerEvent>>;

/// An event pushed by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    /// A transaction involving `address` was confirmed.
    Confirmed {
        /// Subscribed address.
        address: Address,
        /// Confirmed transaction hash.
        hash: Hash256,
    },
    /// A bonded aggregate involving `address` entered the partial cache.
    PartialAdded {
        /// Subscribed address.
        address: Address,
        /// Aggregate hash.
        hash: Hash256,
    },
    /// A cosignature was added to a partial aggregate involving `address`.
    CosignatureAdded {
        /// Subscribed address.
        address: Address,
        /// Aggregate hash.
        parent_hash: Hash256,
        /// Cosigner.
        signer_public_key: Ed25519PublicKey,
    },
    /// A transaction signed by `address` was rejected.
    Status {
        /// Subscribed address.
        address: Address,
        /// Rejected transaction hash.
        hash: Hash256,
        /// Rejection code, for example `Failure_Core_Insufficient_Balance`.
        code: String,
    },
}

impl ListenerEvent {
    /// Address the event was delivered for.
    pub fn address(&self) -> &Address {
        match self {
            Self::Confirmed { address, .. }
            | Self::PartialAdded { address, .. }
            | Self::CosignatureAdded { address, .. }
            | Self::Status { address, .. } => address,
        }
    }

    /// Whether the event was delivered for `address`.
    pub fn concerns(&self, address: &Address) -> bool {
        self.address() == address
    }
}

/// Parses one websocket text frame.
///
/// Returns `None` for frames that are not events, such as the initial `uid`
/// message or channels this crate does not subscribe to.
pub fn parse_message(text: &str) -> DscResult<Option<ListenerEvent>> {
    let value: Value = serde_json::from_str(text)?;
    let Some(topic) = value.get("topic").and_then(Value::as_str) else {
        return Ok(None);
    };
    let (channel, address) = match topic.split_once('/') {
        Some((channel, address)) => (channel, address),
        None => return Ok(None),
    };
    let data = value.get("data").unwrap_or(&Value::Null);

    let event = match channel {
        CONFIRMED_ADDED => ListenerEvent::Confirmed {
            address: Address::from_encoded(address)?,
            hash: hash_at(data, &["meta", "hash"])?,
        },
        PARTIAL_ADDED => ListenerEvent::PartialAdded {
            address: Address::from_encoded(address)?,
            hash: hash_at(data, &["meta", "hash"])?,
        },
        COSIGNATURE => ListenerEvent::CosignatureAdded {
            address: Address::from_encoded(address)?,
            parent_hash: hash_at(data, &["parentHash"])?,
            signer_public_key: Ed25519PublicKey::from_hex(str_at(data, &["signerPublicKey"])?)?,
        },
        STATUS => ListenerEvent::Status {
            address: Address::from_encoded(address)?,
            hash: hash_at(data, &["hash"])?,
            code: str_at(data, &["code"])?.to_string(),
        },
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn str_at<'a>(data: &'a Value, path: &[&str]) -> DscResult<&'a str> {
    path.iter()
        .try_fold(data, |value, key| value.get(key))
        .and_then(Value::as_str)
        .ok_or_else(|| DscError::Subscription(format!("event is missing '{}'", path.join("."))))
}

fn hash_at(data: &Value, path: &[&str]) -> DscResult<Hash256> {
    Hash256::from_hex(str_at(data, path)?)
}

/// A connected websocket that has received its `uid`.
pub struct Listener {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    uid: String,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("uid", &self.uid).finish()
    }
}

impl Listener {
    /// Opens the websocket at `url` and waits for the `uid` message.
    ///
    /// # Errors
    ///
    /// Fails with [`DscError::Connection`] when the handshake or the `uid`
    /// message does not arrive within `timeout`.
    pub async fn connect(url: &Url, timeout: Duration) -> DscResult<Self> {
        let (mut socket, _) = tokio::time::timeout(timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| DscError::Connection(format!("timed out connecting to {url}")))??;

        let uid = tokio::time::timeout(timeout, read_uid(&mut socket))
            .await
            .map_err(|_| DscError::Connection(format!("no uid received from {url}")))??;

        debug!(%url, %uid, "websocket connected");
        Ok(Self { socket, uid })
    }

    /// Connection id assigned by the node.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Subscribes to every channel for `address` and returns the events.
    ///
    /// Malformed frames are logged and skipped. The stream yields an error if
    /// the node closes the connection or the socket fails.
    pub async fn subscribe(mut self, address: &Address) -> DscResult<EventStream> {
        for channel in CHANNELS {
            let request = serde_json::json!({
                "uid": self.uid,
                "subscribe": format!("{channel}/{address}"),
            });
            self.socket.send(Message::Text(request.to_string())).await?;
        }
        debug!(%address, "subscribed");

        let (sink, stream) = self.socket.split();
        let events = stream.filter_map(move |message| {
            // write half lives as long as the event stream
            let _sink = &sink;
            let event = match message {
                Ok(Message::Text(text)) => {
                    trace!(%text, "websocket message");
                    match parse_message(&text) {
                        Ok(event) => event.map(Ok),
                        Err(e) => {
                            warn!(error = %e, "Ignoring malformed event");
                            None
                        }
                    }
                }
                Ok(Message::Close(_)) => Some(Err(DscError::Subscription(
                    "node closed the event stream".to_string(),
                ))),
                Ok(_) => None,
                Err(e) => Some(Err(e.into())),
            };
            futures::future::ready(event)
        });
        Ok(events.boxed())
    }
}

async fn read_uid(socket: &mut WebSocketStream<MaybeTlsStream<TcpStream>>) -> DscResult<String> {
    while let Some(message) = socket.next().await {
        if let Message::Text(text) = message? {
            let value: Value = serde_json::from_str(&text)?;
            if let Some(uid) = value.get("uid").and_then(Value::as_str) {
                return Ok(uid.to_string());
            }
        }
    }
    Err(DscError::Connection(
        "websocket closed before a uid was received".to_string(),
    ))
}
