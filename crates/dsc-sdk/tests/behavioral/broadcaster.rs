//! Announcement flows against the scripted node.

use crate::behavioral::support::*;
use dsc_sdk::account::Account;
use dsc_sdk::broadcast::{
    BroadcastEvent, Broadcaster, CancelReason, ExplorerLinks, FailureStage, Outcome,
    NETWORK_ERROR,
};
use dsc_sdk::config::NodeConfig;
use dsc_sdk::transaction::{cosign, sign_transaction, SignedTransaction, TransactionKind};
use dsc_sdk::types::{Hash256, Mosaic, NetworkType};
use dsc_sdk::DscError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn signed_transfer(account: &Account, amount: u64) -> SignedTransaction {
    let transaction = factory()
        .build(
            account.public_key(),
            TransactionKind::Transfer {
                recipient: account.address(),
                mosaics: vec![Mosaic::new(network_context().currency_mosaic_id, amount)],
                message: None,
            },
        )
        .unwrap();
    sign_transaction(account, transaction, &network_context().generation_hash_seed).unwrap()
}

/// Signed (lock, bonded) pair with one embedded transfer per party.
fn signed_bonded_pair(
    node: &Arc<MockNode>,
    initiator: &Account,
    cosigner: &Account,
) -> (SignedTransaction, SignedTransaction) {
    let factory = factory();
    let transactions = vec![
        factory
            .embed(
                initiator.public_key(),
                TransactionKind::Transfer {
                    recipient: cosigner.address(),
                    mosaics: vec![],
                    message: Some("swap".to_string()),
                },
            )
            .unwrap(),
        factory
            .embed(
                cosigner.public_key(),
                TransactionKind::Transfer {
                    recipient: initiator.address(),
                    mosaics: vec![Mosaic::new(network_context().currency_mosaic_id, 5)],
                    message: None,
                },
            )
            .unwrap(),
    ];
    let ctx = contract_context(node, initiator.clone());
    let lock = ctx.default_lock();
    ctx.prepare_bonded(transactions, lock).unwrap()
}

fn drain(receiver: &mut mpsc::Receiver<BroadcastEvent>) -> Vec<BroadcastEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

mod announce {
    use super::*;

    #[tokio::test]
    async fn test_confirmation_is_terminal_success() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let other = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);
        let hash = signed.hash();

        node.on_announce(
            hash,
            vec![
                confirmed(other.address(), hash),
                confirmed(account.address(), Hash256::sha3_256(b"unrelated")),
                confirmed(account.address(), hash),
            ],
        );

        let outcome = Broadcaster::new(node.clone())
            .announce(&account.address(), &signed)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Confirmed { hash });
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(
            node.calls(),
            vec![Call::Subscribe(account.address()), Call::Announce(hash)]
        );

        let links = ExplorerLinks::new(&NodeConfig::testnet());
        assert!(links.transaction_url(&outcome.hash()).ends_with(&hash.to_hex()));
    }

    #[tokio::test]
    async fn test_status_error_is_terminal_failure() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);
        let hash = signed.hash();

        node.on_announce(
            hash,
            vec![
                status(account.address(), hash, "Failure_Core_Insufficient_Balance"),
                confirmed(account.address(), hash),
            ],
        );

        let outcome = Broadcaster::new(node.clone())
            .announce(&account.address(), &signed)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Failed {
                hash,
                code: "Failure_Core_Insufficient_Balance".to_string(),
                stage: FailureStage::Ledger,
            }
        );
        assert_eq!(outcome.exit_code(), 1);

        let links = ExplorerLinks::new(&NodeConfig::local());
        assert_eq!(
            links.status_url(&hash),
            format!("http://localhost:3000/transactionStatus/{hash}")
        );
    }

    #[tokio::test]
    async fn test_events_before_announce_for_other_hashes_are_ignored() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);
        let hash = signed.hash();

        node.emit_now(status(
            account.address(),
            Hash256::sha3_256(b"older transaction"),
            "Failure_Core_Past_Deadline",
        ));
        node.on_announce(hash, vec![confirmed(account.address(), hash)]);

        let outcome = Broadcaster::new(node.clone())
            .announce(&account.address(), &signed)
            .await
            .unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_submission_rejection() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);
        let hash = signed.hash();
        node.reject(hash, 409, "InvalidArgument");

        let outcome = Broadcaster::new(node.clone())
            .announce(&account.address(), &signed)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Failed {
                hash,
                code: "InvalidArgument".to_string(),
                stage: FailureStage::Submission,
            }
        );
    }

    #[tokio::test]
    async fn test_dropped_announce_request_is_a_submission_failure() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);
        let hash = signed.hash();
        node.drop_connection(hash);

        let outcome = Broadcaster::new(node.clone())
            .announce(&account.address(), &signed)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Failed {
                hash,
                code: NETWORK_ERROR.to_string(),
                stage: FailureStage::Submission,
            }
        );
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(node.calls(), vec![Call::Subscribe(account.address()), Call::Announce(hash)]);
    }

    #[tokio::test]
    async fn test_subscription_failure_announces_nothing() {
        let node = MockNode::unreachable();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);

        let err = Broadcaster::new(node.clone())
            .announce(&account.address(), &signed)
            .await
            .unwrap_err();

        assert!(err.is_connectivity());
        assert_eq!(node.announce_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_end_is_an_error() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);
        node.close_after(signed.hash());

        let err = Broadcaster::new(node.clone())
            .announce(&account.address(), &signed)
            .await
            .unwrap_err();
        assert!(matches!(err, DscError::Subscription(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);
        let token = CancellationToken::new();
        token.cancel();

        let outcome = Broadcaster::new(node.clone())
            .with_cancellation(token)
            .announce(&account.address(), &signed)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Cancelled {
                hash: signed.hash(),
                reason: CancelReason::Requested,
            }
        );
        assert!(node.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);
        let broadcaster = Broadcaster::new(node.clone());
        let token = broadcaster.cancellation_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let outcome = broadcaster
            .announce(&account.address(), &signed)
            .await
            .unwrap();
        assert_eq!(outcome.exit_code(), 130);
        assert_eq!(node.announce_count(), 1);
    }

    #[tokio::test]
    async fn test_wait_timeout() {
        let node = MockNode::new();
        let account = Account::generate(NetworkType::Testnet);
        let signed = signed_transfer(&account, 10);

        let outcome = Broadcaster::new(node.clone())
            .with_wait_timeout(Duration::from_millis(30))
            .announce(&account.address(), &signed)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Cancelled {
                hash: signed.hash(),
                reason: CancelReason::DeadlineElapsed,
            }
        );
    }
}

mod announce_partial {
    use super::*;

    #[tokio::test]
    async fn test_lock_then_bonded_then_confirmed() {
        let node = MockNode::new();
        let initiator = Account::generate(NetworkType::Testnet);
        let cosigner = Account::generate(NetworkType::Testnet);
        let (lock, bonded) = signed_bonded_pair(&node, &initiator, &cosigner);
        let address = initiator.address();

        node.on_announce(lock.hash(), vec![confirmed(address, lock.hash())]);
        node.on_announce(
            bonded.hash(),
            vec![
                partial_added(address, bonded.hash()),
                cosignature_added(address, bonded.hash(), cosigner.public_key()),
                cosignature_added(address, Hash256::sha3_256(b"other"), cosigner.public_key()),
                confirmed(address, bonded.hash()),
            ],
        );

        let (sender, mut receiver) = mpsc::channel(32);
        let outcome = Broadcaster::new(node.clone())
            .with_event_sender(sender)
            .announce_partial(&address, &lock, &bonded)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Confirmed { hash: bonded.hash() });
        assert_eq!(
            node.calls(),
            vec![
                Call::Subscribe(address),
                Call::Announce(lock.hash()),
                Call::AnnouncePartial(bonded.hash()),
            ]
        );

        let events = drain(&mut receiver);
        assert_eq!(
            events,
            vec![
                BroadcastEvent::Subscribed { address },
                BroadcastEvent::Announced { hash: lock.hash() },
                BroadcastEvent::LockConfirmed { hash: lock.hash() },
                BroadcastEvent::Announced { hash: bonded.hash() },
                BroadcastEvent::PartialAdded { hash: bonded.hash() },
                BroadcastEvent::CosignatureAdded {
                    parent_hash: bonded.hash(),
                    signer: cosigner.public_key(),
                },
                BroadcastEvent::Confirmed { hash: bonded.hash() },
            ]
        );
    }

    #[tokio::test]
    async fn test_many_cosignatures_do_not_end_the_wait() {
        let node = MockNode::new();
        let initiator = Account::generate(NetworkType::Testnet);
        let cosigner = Account::generate(NetworkType::Testnet);
        let (lock, bonded) = signed_bonded_pair(&node, &initiator, &cosigner);
        let address = initiator.address();

        node.on_announce(lock.hash(), vec![confirmed(address, lock.hash())]);
        let mut script: Vec<_> = (0..5)
            .map(|_| {
                let cosigner = Account::generate(NetworkType::Testnet);
                cosignature_added(address, bonded.hash(), cosigner.public_key())
            })
            .collect();
        script.push(confirmed(address, bonded.hash()));
        node.on_announce(bonded.hash(), script);

        let (sender, mut receiver) = mpsc::channel(32);
        let outcome = Broadcaster::new(node.clone())
            .with_event_sender(sender)
            .announce_partial(&address, &lock, &bonded)
            .await
            .unwrap();

        assert!(outcome.is_success());
        let cosignatures = drain(&mut receiver)
            .into_iter()
            .filter(|e| matches!(e, BroadcastEvent::CosignatureAdded { .. }))
            .count();
        assert_eq!(cosignatures, 5);
    }

    #[tokio::test]
    async fn test_bonded_events_before_lock_confirmation_are_ignored() {
        let node = MockNode::new();
        let initiator = Account::generate(NetworkType::Testnet);
        let cosigner = Account::generate(NetworkType::Testnet);
        let (lock, bonded) = signed_bonded_pair(&node, &initiator, &cosigner);
        let address = initiator.address();

        node.emit_now(confirmed(address, bonded.hash()));
        node.on_announce(lock.hash(), vec![confirmed(address, lock.hash())]);
        node.on_announce(bonded.hash(), vec![confirmed(address, bonded.hash())]);

        let outcome = Broadcaster::new(node.clone())
            .announce_partial(&address, &lock, &bonded)
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(node.calls()[1], Call::Announce(lock.hash()));
        assert_eq!(node.calls()[2], Call::AnnouncePartial(bonded.hash()));
    }

    #[tokio::test]
    async fn test_lock_failure_never_submits_bonded() {
        let node = MockNode::new();
        let initiator = Account::generate(NetworkType::Testnet);
        let cosigner = Account::generate(NetworkType::Testnet);
        let (lock, bonded) = signed_bonded_pair(&node, &initiator, &cosigner);
        let address = initiator.address();

        node.on_announce(
            lock.hash(),
            vec![status(address, lock.hash(), "Failure_LockHash_Inactive_Hash")],
        );

        let outcome = Broadcaster::new(node.clone())
            .announce_partial(&address, &lock, &bonded)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Failed {
                hash: lock.hash(),
                code: "Failure_LockHash_Inactive_Hash".to_string(),
                stage: FailureStage::Ledger,
            }
        );
        assert_eq!(node.announce_count(), 1);
        assert!(!node
            .calls()
            .iter()
            .any(|call| matches!(call, Call::AnnouncePartial(_))));
    }

    #[tokio::test]
    async fn test_dropped_bonded_announce_after_lock() {
        let node = MockNode::new();
        let initiator = Account::generate(NetworkType::Testnet);
        let cosigner = Account::generate(NetworkType::Testnet);
        let (lock, bonded) = signed_bonded_pair(&node, &initiator, &cosigner);
        let address = initiator.address();

        node.on_announce(lock.hash(), vec![confirmed(address, lock.hash())]);
        node.drop_connection(bonded.hash());

        let outcome = Broadcaster::new(node.clone())
            .announce_partial(&address, &lock, &bonded)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Failed {
                hash: bonded.hash(),
                code: NETWORK_ERROR.to_string(),
                stage: FailureStage::Submission,
            }
        );
    }

    #[tokio::test]
    async fn test_bonded_failure_after_lock() {
        let node = MockNode::new();
        let initiator = Account::generate(NetworkType::Testnet);
        let cosigner = Account::generate(NetworkType::Testnet);
        let (lock, bonded) = signed_bonded_pair(&node, &initiator, &cosigner);
        let address = initiator.address();

        node.on_announce(lock.hash(), vec![confirmed(address, lock.hash())]);
        node.on_announce(
            bonded.hash(),
            vec![status(address, bonded.hash(), "Failure_Aggregate_Missing_Cosignatures")],
        );

        let outcome = Broadcaster::new(node.clone())
            .announce_partial(&address, &lock, &bonded)
            .await
            .unwrap();
        assert_eq!(outcome.hash(), bonded.hash());
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_mismatched_lock_is_rejected_before_subscribing() {
        let node = MockNode::new();
        let initiator = Account::generate(NetworkType::Testnet);
        let cosigner = Account::generate(NetworkType::Testnet);
        let (lock, bonded) = signed_bonded_pair(&node, &initiator, &cosigner);
        let plain = signed_transfer(&initiator, 1);

        let broadcaster = Broadcaster::new(node.clone());
        assert!(broadcaster
            .announce_partial(&initiator.address(), &lock, &plain)
            .await
            .is_err());
        assert!(broadcaster
            .announce_partial(&initiator.address(), &plain, &bonded)
            .await
            .is_err());
        assert!(node.calls().is_empty());
    }
}

mod announce_cosignature {
    use super::*;

    #[tokio::test]
    async fn test_only_matching_cosignature_confirms() {
        let node = MockNode::new();
        let cosigner = Account::generate(NetworkType::Testnet);
        let stranger = Account::generate(NetworkType::Testnet);
        let parent = Hash256::sha3_256(b"bonded aggregate");
        let address = cosigner.address();
        let cosignature = cosign(&cosigner, parent);

        node.on_announce(
            parent,
            vec![
                cosignature_added(
                    address,
                    Hash256::sha3_256(b"other parent"),
                    cosigner.public_key(),
                ),
                cosignature_added(address, parent, stranger.public_key()),
                cosignature_added(address, parent, cosigner.public_key()),
            ],
        );

        let (sender, mut receiver) = mpsc::channel(32);
        let outcome = Broadcaster::new(node.clone())
            .with_event_sender(sender)
            .announce_cosignature(&address, &cosignature)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Confirmed { hash: parent });
        assert_eq!(
            node.calls(),
            vec![Call::Subscribe(address), Call::AnnounceCosignature(parent)]
        );
        let cosignatures: Vec<_> = drain(&mut receiver)
            .into_iter()
            .filter(|e| matches!(e, BroadcastEvent::CosignatureAdded { .. }))
            .collect();
        assert_eq!(
            cosignatures,
            vec![BroadcastEvent::CosignatureAdded {
                parent_hash: parent,
                signer: cosigner.public_key(),
            }]
        );
    }

    #[tokio::test]
    async fn test_status_for_parent_fails() {
        let node = MockNode::new();
        let cosigner = Account::generate(NetworkType::Testnet);
        let parent = Hash256::sha3_256(b"bonded aggregate");
        let address = cosigner.address();

        node.on_announce(
            parent,
            vec![status(address, parent, "Failure_Aggregate_Ineligible_Cosignatories")],
        );

        let outcome = Broadcaster::new(node.clone())
            .announce_cosignature(&address, &cosign(&cosigner, parent))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code(), 1);
    }
}
