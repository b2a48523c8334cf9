//! Building and signing through the public API.

use crate::behavioral::support::*;
use dsc_sdk::account::{Account, PublicAccount};
use dsc_sdk::crypto::Ed25519PrivateKey;
use dsc_sdk::transaction::{
    codec, cosign, sign_transaction, verify_transaction, TransactionKind, TransactionType,
};
use dsc_sdk::types::{Address, Mosaic, NetworkType};

fn transfer_kind(recipient: Address) -> TransactionKind {
    TransactionKind::Transfer {
        recipient,
        mosaics: vec![Mosaic::new(network_context().currency_mosaic_id, 1)],
        message: Some("hello".to_string()),
    }
}

#[test]
fn test_factory_is_deterministic() {
    let account = Account::generate(NetworkType::Testnet);
    let first = factory().build(account.public_key(), transfer_kind(account.address())).unwrap();
    let second = factory().build(account.public_key(), transfer_kind(account.address())).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        codec::encode_transaction(&first, None),
        codec::encode_transaction(&second, None)
    );
}

#[test]
fn test_signed_hash_is_stable_and_verifies() {
    let account = Account::generate(NetworkType::Testnet);
    let seed = network_context().generation_hash_seed;
    let transaction = factory()
        .build(account.public_key(), transfer_kind(account.address()))
        .unwrap();

    let first = sign_transaction(&account, transaction.clone(), &seed).unwrap();
    let second = sign_transaction(&account, transaction, &seed).unwrap();
    assert_eq!(first.hash(), second.hash());
    assert_eq!(first.transaction_type(), TransactionType::Transfer);
    assert!(verify_transaction(&first, &seed).is_ok());

    let other_seed = dsc_sdk::Hash256::sha3_256(b"another network");
    assert!(verify_transaction(&first, &other_seed).is_err());
}

#[test]
fn test_signing_with_the_wrong_key_fails() {
    let account = Account::generate(NetworkType::Testnet);
    let intruder = Account::generate(NetworkType::Testnet);
    let transaction = factory()
        .build(account.public_key(), transfer_kind(account.address()))
        .unwrap();
    let seed = network_context().generation_hash_seed;
    assert!(sign_transaction(&intruder, transaction, &seed).is_err());
}

#[test]
fn test_cosignature_verifies_against_parent() {
    let account = Account::generate(NetworkType::Testnet);
    let parent = dsc_sdk::Hash256::sha3_256(b"parent");
    let cosignature = cosign(&account, parent);
    assert!(cosignature.verify().is_ok());
    assert_eq!(cosignature.to_cosignature().signer_public_key, account.public_key());
}

#[test]
fn test_account_round_trips_through_hex() {
    let key = Ed25519PrivateKey::generate();
    let public_hex = key.public_key().to_hex();
    let account = Account::from_private_key(key, NetworkType::Testnet);

    let public = PublicAccount::from_hex(&public_hex, NetworkType::Testnet).unwrap();
    assert_eq!(public.address, account.address());

    let encoded = account.address().to_string();
    assert!(encoded.starts_with('T'));
    assert_eq!(encoded.parse::<Address>().unwrap(), account.address());
}

#[test]
fn test_hash_lock_only_funds_bonded_aggregates() {
    let account = Account::generate(NetworkType::Testnet);
    let seed = network_context().generation_hash_seed;
    let plain = factory().build(account.public_key(), transfer_kind(account.address())).unwrap();
    let signed = sign_transaction(&account, plain, &seed).unwrap();
    let deposit = Mosaic::new(network_context().currency_mosaic_id, 10_000_000);

    assert!(factory()
        .hash_lock(account.public_key(), deposit, 5_760, &signed)
        .is_err());
}
