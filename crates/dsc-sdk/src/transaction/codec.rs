//! Binary transaction layout.
//!
//! All integers are little-endian. A top-level transaction is a 128 byte
//! header followed by its body; an embedded transaction is a 48 byte header
//! followed by its body, padded to 8 bytes inside the aggregate payload.

use crate::crypto::{merkle_root, Ed25519Signature, ED25519_SIGNATURE_LENGTH};
use crate::transaction::types::{
    AggregateBody, EmbeddedTransaction, NamespaceRegistration, Transaction, TransactionBody,
    TransactionType,
};
use crate::types::Hash256;
use bytes::{BufMut, BytesMut};

/// Size of a top-level transaction header.
pub const HEADER_SIZE: usize = 128;
/// Size of an embedded transaction header.
pub const EMBEDDED_HEADER_SIZE: usize = 48;
/// Offset of the signature in a top-level transaction.
pub const SIGNATURE_OFFSET: usize = 8;
/// Offset of the signer public key in a top-level transaction.
pub const SIGNER_OFFSET: usize = SIGNATURE_OFFSET + ED25519_SIGNATURE_LENGTH;
/// Signed data starts after size, signature, signer and reserved fields.
pub const SIGNING_OFFSET: usize = 108;
/// Aggregates sign their header and transactions hash only.
const AGGREGATE_SIGNING_END: usize = HEADER_SIZE + 32;
const EMBEDDED_ALIGNMENT: usize = 8;

/// Serializes a top-level transaction. Without a signature the signature
/// field is zero-filled.
pub fn encode_transaction(
    transaction: &Transaction,
    signature: Option<&Ed25519Signature>,
) -> Vec<u8> {
    let body = encode_body(&transaction.body);
    let ty = transaction.transaction_type();
    let size = HEADER_SIZE + body.len();

    let mut buf = BytesMut::with_capacity(size);
    buf.put_u32_le(size as u32);
    buf.put_u32_le(0);
    match signature {
        Some(signature) => buf.put_slice(&signature.to_bytes()),
        None => buf.put_bytes(0, ED25519_SIGNATURE_LENGTH),
    }
    buf.put_slice(&transaction.signer_public_key.to_bytes());
    buf.put_u32_le(0);
    buf.put_u8(ty.version());
    buf.put_u8(transaction.network.as_byte());
    buf.put_u16_le(ty.code());
    buf.put_u64_le(transaction.max_fee);
    buf.put_u64_le(transaction.deadline);
    buf.put_slice(&body);
    buf.to_vec()
}

/// Serializes an embedded transaction without trailing padding.
pub fn encode_embedded(transaction: &EmbeddedTransaction) -> Vec<u8> {
    let body = encode_body(transaction.body());
    let ty = transaction.transaction_type();
    let size = EMBEDDED_HEADER_SIZE + body.len();

    let mut buf = BytesMut::with_capacity(size);
    buf.put_u32_le(size as u32);
    buf.put_u32_le(0);
    buf.put_slice(&transaction.signer_public_key().to_bytes());
    buf.put_u32_le(0);
    buf.put_u8(ty.version());
    buf.put_u8(transaction.network().as_byte());
    buf.put_u16_le(ty.code());
    buf.put_slice(&body);
    buf.to_vec()
}

/// The bytes covered by the signer's signature.
pub fn signing_bytes(encoded: &[u8], ty: TransactionType) -> &[u8] {
    let end = if ty.is_aggregate() {
        AGGREGATE_SIGNING_END.min(encoded.len())
    } else {
        encoded.len()
    };
    &encoded[SIGNING_OFFSET.min(end)..end]
}

/// Hash of a signed, serialized transaction.
pub fn transaction_hash(
    encoded: &[u8],
    ty: TransactionType,
    generation_hash_seed: &Hash256,
) -> Hash256 {
    let half_signature =
        &encoded[SIGNATURE_OFFSET..SIGNATURE_OFFSET + ED25519_SIGNATURE_LENGTH / 2];
    let signer = &encoded[SIGNER_OFFSET..SIGNER_OFFSET + 32];
    Hash256::sha3_256_of([
        half_signature,
        signer,
        generation_hash_seed.as_bytes(),
        signing_bytes(encoded, ty),
    ])
}

/// Merkle root over the unpadded embedded transactions.
pub fn aggregate_transactions_hash(transactions: &[EmbeddedTransaction]) -> Hash256 {
    let leaves: Vec<Hash256> = transactions
        .iter()
        .map(|transaction| Hash256::sha3_256(encode_embedded(transaction)))
        .collect();
    merkle_root(&leaves)
}

fn padding(size: usize) -> usize {
    (EMBEDDED_ALIGNMENT - size % EMBEDDED_ALIGNMENT) % EMBEDDED_ALIGNMENT
}

fn encode_body(body: &TransactionBody) -> Vec<u8> {
    let mut buf = BytesMut::new();
    match body {
        TransactionBody::Transfer(transfer) => {
            let message = transfer.message_bytes();
            let mut mosaics = transfer.mosaics.clone();
            mosaics.sort_by_key(|mosaic| mosaic.id.value());

            buf.put_slice(transfer.recipient.as_bytes());
            buf.put_u16_le(message.len() as u16);
            buf.put_u8(mosaics.len() as u8);
            buf.put_u32_le(0);
            buf.put_u8(0);
            for mosaic in mosaics {
                buf.put_u64_le(mosaic.id.value());
                buf.put_u64_le(mosaic.amount);
            }
            buf.put_slice(&message);
        }
        TransactionBody::NamespaceRegistration(registration) => {
            let registration_type = match registration.registration {
                NamespaceRegistration::Root { duration } => {
                    buf.put_u64_le(duration);
                    0
                }
                NamespaceRegistration::Child { parent_id } => {
                    buf.put_u64_le(parent_id.value());
                    1
                }
            };
            buf.put_u64_le(registration.id.value());
            buf.put_u8(registration_type);
            buf.put_u8(registration.name.len() as u8);
            buf.put_slice(registration.name.as_bytes());
        }
        TransactionBody::MosaicDefinition(definition) => {
            buf.put_u64_le(definition.id.value());
            buf.put_u64_le(definition.duration);
            buf.put_u32_le(definition.nonce);
            buf.put_u8(definition.flags.bits());
            buf.put_u8(definition.divisibility);
        }
        TransactionBody::MosaicSupplyChange(change) => {
            buf.put_u64_le(change.mosaic_id.value());
            buf.put_u64_le(change.delta);
            buf.put_u8(change.action.as_byte());
        }
        TransactionBody::MosaicAlias(alias) => {
            buf.put_u64_le(alias.namespace_id.value());
            buf.put_u64_le(alias.mosaic_id.value());
            buf.put_u8(alias.action.as_byte());
        }
        TransactionBody::HashLock(lock) => {
            buf.put_u64_le(lock.mosaic.id.value());
            buf.put_u64_le(lock.mosaic.amount);
            buf.put_u64_le(lock.duration);
            buf.put_slice(lock.hash.as_bytes());
        }
        TransactionBody::Aggregate(aggregate) => encode_aggregate(&mut buf, aggregate),
    }
    buf.to_vec()
}

fn encode_aggregate(buf: &mut BytesMut, aggregate: &AggregateBody) {
    let mut payload = BytesMut::new();
    let mut leaves = Vec::with_capacity(aggregate.transactions.len());
    for transaction in &aggregate.transactions {
        let encoded = encode_embedded(transaction);
        leaves.push(Hash256::sha3_256(&encoded));
        payload.put_slice(&encoded);
        payload.put_bytes(0, padding(encoded.len()));
    }

    buf.put_slice(merkle_root(&leaves).as_bytes());
    buf.put_u32_le(payload.len() as u32);
    buf.put_u32_le(0);
    buf.put_slice(&payload);
    for cosignature in &aggregate.cosignatures {
        buf.put_u64_le(cosignature.version);
        buf.put_slice(&cosignature.signer_public_key.to_bytes());
        buf.put_slice(&cosignature.signature.to_bytes());
    }
}
