//! Node access.
//!
//! - [`RestClient`] announces transactions and answers lookups over REST
//! - [`Listener`] subscribes to confirmation, partial, cosignature and status
//!   events over the websocket
//! - [`NodeTransport`] is what the broadcaster talks to; [`NodeClient`] is the
//!   real implementation

pub mod listener;
pub mod response;
mod rest;
mod transport;

pub use listener::{parse_message, EventStream, Listener, ListenerEvent};
pub use response::{AnnounceResponse, CosignatureRequest, NetworkProperties, PayloadRequest};
pub use rest::{NodeLookup, RestClient};
pub use transport::{NodeClient, NodeTransport};
