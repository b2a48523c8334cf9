//! Contract packaging and orchestration.

use crate::behavioral::support::*;
use dsc_sdk::account::Account;
use dsc_sdk::broadcast::Outcome;
use dsc_sdk::contract::{self, StaticResolver};
use dsc_sdk::transaction::{
    NamespaceRegistration, TransactionBody, TransactionType,
};
use dsc_sdk::types::{Hash256, MosaicId, NamespaceId, NetworkType, UnresolvedMosaicId};
use dsc_sdk::DscError;

fn run_params(pairs: &[(&str, &str)]) -> StaticResolver {
    pairs
        .iter()
        .fold(StaticResolver::new(), |params, (name, value)| params.with(*name, *value))
}

#[test]
fn test_catalogue_names_are_unique() {
    let names: Vec<_> = contract::catalogue().iter().map(|c| c.name()).collect();
    let mut deduped = names.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(names.len(), deduped.len());
    assert!(contract::find("escrow").is_some());
    assert!(contract::find("nope").is_none());
}

mod transfer {
    use super::*;

    #[tokio::test]
    async fn test_transfer_is_a_plain_transaction() {
        let node = MockNode::new();
        node.confirm_everything();
        let account = Account::generate(NetworkType::Testnet);
        let recipient = Account::generate(NetworkType::Testnet);
        let ctx = contract_context(&node, account.clone());

        let recipient_address = recipient.address().to_string();
        let params = run_params(&[
            ("recipient", recipient_address.as_str()),
            ("amount", "1500000"),
            ("message", "thanks"),
        ]);
        let outcome = contract::find("transfer")
            .unwrap()
            .execute(&ctx, &params)
            .await
            .unwrap();

        let announced = node.announced();
        assert_eq!(announced.len(), 1);
        assert_eq!(outcome, Outcome::Confirmed { hash: announced[0].hash() });
        match &announced[0].transaction().body {
            TransactionBody::Transfer(body) => {
                assert_eq!(body.recipient, recipient.address());
                assert_eq!(body.mosaics.len(), 1);
                assert_eq!(body.mosaics[0].amount, 1_500_000);
                assert_eq!(
                    body.mosaics[0].id,
                    UnresolvedMosaicId::from(MosaicId::new(0x72C0_212E_67A0_8BCE))
                );
                assert_eq!(body.message.as_deref(), Some("thanks"));
            }
            other => panic!("unexpected body {other:?}"),
        }
        assert_eq!(
            node.calls(),
            vec![Call::Subscribe(account.address()), Call::Announce(announced[0].hash())]
        );
    }

    #[tokio::test]
    async fn test_missing_parameter_aborts_before_any_protocol_step() {
        let node = MockNode::new();
        let ctx = contract_context(&node, Account::generate(NetworkType::Testnet));

        let err = contract::find("transfer")
            .unwrap()
            .execute(&ctx, &run_params(&[("amount", "1")]))
            .await
            .unwrap_err();

        assert!(matches!(err, DscError::Parameter { ref name, .. } if name == "recipient"));
        assert!(node.calls().is_empty());
    }

    #[tokio::test]
    async fn test_recipient_on_another_network_is_rejected() {
        let node = MockNode::new();
        let ctx = contract_context(&node, Account::generate(NetworkType::Testnet));
        let mainnet = Account::generate(NetworkType::Mainnet).address().to_string();

        let result = contract::find("transfer")
            .unwrap()
            .execute(&ctx, &run_params(&[("recipient", mainnet.as_str()), ("amount", "1")]))
            .await;

        assert!(result.is_err());
        assert!(node.calls().is_empty());
    }
}

mod namespace {
    use super::*;

    #[tokio::test]
    async fn test_root_namespace_in_complete_aggregate() {
        let node = MockNode::new();
        node.confirm_everything();
        let ctx = contract_context(&node, Account::generate(NetworkType::Testnet));

        let outcome = contract::find("create-namespace")
            .unwrap()
            .execute(&ctx, &run_params(&[("name", "disposable")]))
            .await
            .unwrap();
        assert!(outcome.is_success());

        let announced = node.announced();
        assert_eq!(announced.len(), 1);
        assert_eq!(announced[0].transaction_type(), TransactionType::AggregateComplete);
        let aggregate = announced[0].transaction().aggregate().unwrap();
        assert_eq!(aggregate.transactions.len(), 1);
        match aggregate.transactions[0].body() {
            TransactionBody::NamespaceRegistration(body) => {
                assert_eq!(body.name, "disposable");
                assert_eq!(body.id, NamespaceId::from_name("disposable", None).unwrap());
                assert_eq!(body.registration, NamespaceRegistration::Root { duration: 86_400 });
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_existing_namespace_fails_early() {
        let node = MockNode::new();
        node.add_namespace(NamespaceId::from_name("taken", None).unwrap());
        let ctx = contract_context(&node, Account::generate(NetworkType::Testnet));

        let err = contract::find("create-namespace")
            .unwrap()
            .execute(&ctx, &run_params(&[("name", "taken")]))
            .await
            .unwrap_err();

        assert!(matches!(err, DscError::InvalidNamespace(_)));
        assert!(node.calls().is_empty());
    }
}

mod mosaic {
    use super::*;

    #[tokio::test]
    async fn test_mosaic_with_alias_registers_missing_levels() {
        let node = MockNode::new();
        node.confirm_everything();
        node.add_namespace(NamespaceId::from_name("tokens", None).unwrap());
        let account = Account::generate(NetworkType::Testnet);
        let ctx = contract_context(&node, account.clone());

        let outcome = contract::find("create-mosaic")
            .unwrap()
            .execute(
                &ctx,
                &run_params(&[
                    ("supply", "500"),
                    ("divisibility", "2"),
                    ("nonce", "7"),
                    ("name", "tokens.gold"),
                ]),
            )
            .await
            .unwrap();
        assert!(outcome.is_success());

        let announced = node.announced();
        assert_eq!(announced.len(), 1);
        let aggregate = announced[0].transaction().aggregate().unwrap();
        let types: Vec<_> = aggregate
            .transactions
            .iter()
            .map(|t| t.transaction_type())
            .collect();
        assert_eq!(
            types,
            vec![
                TransactionType::MosaicDefinition,
                TransactionType::MosaicSupplyChange,
                TransactionType::NamespaceRegistration,
                TransactionType::MosaicAlias,
            ]
        );

        let expected_id = MosaicId::from_nonce(&account.address(), 7);
        match aggregate.transactions[3].body() {
            TransactionBody::MosaicAlias(body) => {
                assert_eq!(body.mosaic_id, expected_id);
                assert_eq!(body.namespace_id, NamespaceId::from_full_name("tokens.gold").unwrap());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_divisibility() {
        let node = MockNode::new();
        let ctx = contract_context(&node, Account::generate(NetworkType::Testnet));
        let err = contract::find("create-mosaic")
            .unwrap()
            .execute(&ctx, &run_params(&[("divisibility", "9")]))
            .await
            .unwrap_err();
        assert!(matches!(err, DscError::Parameter { .. }));
    }
}

mod bonded {
    use super::*;

    #[tokio::test]
    async fn test_escrow_uses_lock_then_bonded() {
        let node = MockNode::new();
        node.confirm_everything();
        let account = Account::generate(NetworkType::Testnet);
        let counterparty = Account::generate(NetworkType::Testnet);
        let ctx = contract_context(&node, account.clone());

        let counterparty_key = counterparty.public_key().to_hex();
        let params = run_params(&[
            ("counterparty", counterparty_key.as_str()),
            ("giveAmount", "100"),
            ("receiveMosaic", "0x00000000000000AB"),
            ("receiveAmount", "3"),
        ]);
        let outcome = contract::find("escrow")
            .unwrap()
            .execute(&ctx, &params)
            .await
            .unwrap();

        let announced = node.announced();
        assert_eq!(announced.len(), 2);
        let (lock, bonded) = (&announced[0], &announced[1]);
        assert_eq!(outcome, Outcome::Confirmed { hash: bonded.hash() });
        assert_eq!(bonded.transaction_type(), TransactionType::AggregateBonded);

        match &lock.transaction().body {
            TransactionBody::HashLock(body) => {
                assert_eq!(body.hash, bonded.hash());
                assert_eq!(body.mosaic.amount, 10_000_000);
                assert_eq!(body.duration, 5_760);
            }
            other => panic!("unexpected body {other:?}"),
        }

        let signers: Vec<_> = bonded
            .transaction()
            .aggregate()
            .unwrap()
            .transactions
            .iter()
            .map(|t| t.signer_public_key())
            .collect();
        assert_eq!(signers, vec![account.public_key(), counterparty.public_key()]);
        assert_eq!(
            node.calls(),
            vec![
                Call::Subscribe(account.address()),
                Call::Announce(lock.hash()),
                Call::AnnouncePartial(bonded.hash()),
            ]
        );
    }

    #[tokio::test]
    async fn test_escrow_with_self_is_rejected() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let ctx = contract_context(&node, account.clone());
        let own_key = account.public_key().to_hex();

        let err = contract::find("escrow")
            .unwrap()
            .execute(&ctx, &run_params(&[("counterparty", own_key.as_str())]))
            .await
            .unwrap_err();
        assert!(matches!(err, DscError::Parameter { ref name, .. } if name == "counterparty"));
        assert!(node.calls().is_empty());
    }

    #[tokio::test]
    async fn test_request_from_friend_with_lock_override() {
        let node = MockNode::new();
        node.confirm_everything();
        let account = Account::generate(NetworkType::Testnet);
        let friend = Account::generate(NetworkType::Testnet);
        let ctx = contract_context(&node, account.clone());

        let friend_key = friend.public_key().to_hex();
        let params = run_params(&[
            ("friend", friend_key.as_str()),
            ("amount", "42"),
            ("lockAmount", "5"),
        ]);
        let outcome = contract::find("request-from-friend")
            .unwrap()
            .execute(&ctx, &params)
            .await
            .unwrap();
        assert!(outcome.is_success());

        let announced = node.announced();
        match &announced[0].transaction().body {
            TransactionBody::HashLock(body) => {
                assert_eq!(body.mosaic.amount, 5);
                assert_eq!(body.hash, announced[1].hash());
            }
            other => panic!("unexpected body {other:?}"),
        }
        let aggregate = announced[1].transaction().aggregate().unwrap();
        match aggregate.transactions[0].body() {
            TransactionBody::Transfer(body) => {
                assert_eq!(body.recipient, friend.address());
                assert!(body.mosaics.is_empty());
                assert!(body.message.is_some());
            }
            other => panic!("unexpected body {other:?}"),
        }
        assert_eq!(aggregate.transactions[1].signer_public_key(), friend.public_key());
    }
}

mod cosign {
    use super::*;

    #[tokio::test]
    async fn test_cosign_pending_aggregate() {
        let node = MockNode::new();
        node.confirm_everything();
        let parent = Hash256::sha3_256(b"pending bonded");
        node.add_partial(parent);
        let account = Account::generate(NetworkType::Testnet);
        let ctx = contract_context(&node, account.clone());

        let hash = parent.to_hex();
        let outcome = contract::find("cosign")
            .unwrap()
            .execute(&ctx, &run_params(&[("hash", hash.as_str())]))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Confirmed { hash: parent });
        assert_eq!(
            node.calls(),
            vec![Call::Subscribe(account.address()), Call::AnnounceCosignature(parent)]
        );
    }

    #[tokio::test]
    async fn test_cosign_unknown_aggregate() {
        let node = MockNode::new();
        let ctx = contract_context(&node, Account::generate(NetworkType::Testnet));
        let hash = Hash256::sha3_256(b"missing").to_hex();

        let err = contract::find("cosign")
            .unwrap()
            .execute(&ctx, &run_params(&[("hash", hash.as_str())]))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(node.calls().is_empty());
    }
}
