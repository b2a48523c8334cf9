//! Transaction and cosignature signing.

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::error::{DscError, DscResult};
use crate::transaction::codec;
use crate::transaction::types::{CosignatureSignedTransaction, SignedTransaction, Transaction};
use crate::types::{Address, Hash256};

/// A signing capability. Stateless per call.
pub trait Signer: Send + Sync {
    /// The signer's public key.
    fn public_key(&self) -> Ed25519PublicKey;

    /// The signer's address.
    fn address(&self) -> Address;

    /// Signs arbitrary bytes.
    fn sign_message(&self, message: &[u8]) -> Ed25519Signature;
}

/// Signs `transaction` for the network identified by `generation_hash_seed`.
///
/// The hash of the result is computed here, once.
pub fn sign_transaction<S: Signer + ?Sized>(
    signer: &S,
    transaction: Transaction,
    generation_hash_seed: &Hash256,
) -> DscResult<SignedTransaction> {
    if transaction.signer_public_key != signer.public_key() {
        return Err(DscError::transaction(format!(
            "transaction signer {} does not match signing key {}",
            transaction.signer_public_key,
            signer.public_key()
        )));
    }
    transaction.body.validate()?;

    let ty = transaction.transaction_type();
    let unsigned = codec::encode_transaction(&transaction, None);
    let message = signing_message(&unsigned, &transaction, generation_hash_seed);
    let signature = signer.sign_message(&message);

    let payload = codec::encode_transaction(&transaction, Some(&signature));
    let hash = codec::transaction_hash(&payload, ty, generation_hash_seed);
    Ok(SignedTransaction::new(transaction, signature, hash, payload))
}

/// Produces a detached cosignature for the bonded aggregate `parent_hash`.
pub fn cosign<S: Signer + ?Sized>(
    signer: &S,
    parent_hash: Hash256,
) -> CosignatureSignedTransaction {
    CosignatureSignedTransaction {
        parent_hash,
        signer_public_key: signer.public_key(),
        signature: signer.sign_message(parent_hash.as_bytes()),
        version: 0,
    }
}

/// Checks the signer's signature on `signed`.
pub fn verify_transaction(
    signed: &SignedTransaction,
    generation_hash_seed: &Hash256,
) -> DscResult<()> {
    let unsigned = codec::encode_transaction(signed.transaction(), None);
    let message = signing_message(&unsigned, signed.transaction(), generation_hash_seed);
    signed
        .transaction()
        .signer_public_key
        .verify(&message, &signed.signature())
}

fn signing_message(
    unsigned: &[u8],
    transaction: &Transaction,
    generation_hash_seed: &Hash256,
) -> Vec<u8> {
    let data = codec::signing_bytes(unsigned, transaction.transaction_type());
    let mut message = Vec::with_capacity(generation_hash_seed.as_bytes().len() + data.len());
    message.extend_from_slice(generation_hash_seed.as_bytes());
    message.extend_from_slice(data);
    message
}
