//! Core ledger value types.

mod address;
mod hash;
mod mosaic;
mod network;

pub use address::{Address, ADDRESS_LENGTH, ENCODED_ADDRESS_LENGTH};
pub use hash::{Hash256, HASH_LENGTH};
pub use mosaic::{
    validate_namespace_part, Mosaic, MosaicFlags, MosaicId, NamespaceId, UnresolvedMosaicId,
};
pub use network::{NetworkContext, NetworkType};

pub(crate) use network::now_millis;
