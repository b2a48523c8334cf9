//! Cryptographic primitives.
//!
//! - [`ed25519`] keys and signatures used for transactions and cosignatures
//! - [`merkle_root`] over embedded transaction hashes, committed to by
//!   aggregate transactions

pub mod ed25519;

pub use ed25519::{
    Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature, ED25519_PRIVATE_KEY_LENGTH,
    ED25519_PUBLIC_KEY_LENGTH, ED25519_SIGNATURE_LENGTH,
};

use crate::types::Hash256;

/// Computes the merkle root of `leaves`.
///
/// Levels with an odd number of nodes pair the last node with itself. An
/// empty tree has the zero hash as its root.
pub fn merkle_root(leaves: &[Hash256]) -> Hash256 {
    if leaves.is_empty() {
        return Hash256::ZERO;
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            if let Some(last) = level.last().copied() {
                level.push(last);
            }
        }
        level = level
            .chunks(2)
            .map(|pair| Hash256::sha3_256_of([pair[0].as_bytes(), pair[1].as_bytes()]))
            .collect();
    }
    level[0]
}
