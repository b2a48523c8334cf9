use crate::broadcast::Outcome;
use crate::contract::params::{parse_mosaic_ref, resolve_parsed};
use crate::contract::{currency_default, resolve_lock, Contract, ContractContext, ParameterResolver};
use crate::crypto::Ed25519PublicKey;
use crate::error::{DscError, DscResult};
use crate::transaction::TransactionKind;
use crate::types::{Address, Mosaic};
use async_trait::async_trait;

const DEFAULT_REQUEST_MESSAGE: &str = "Could you send me some funds?";

/// Asks a friend for funds: a message to the friend and a transfer back,
/// bundled in a bonded aggregate the friend approves by cosigning.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFromFriendContract;

#[async_trait]
impl Contract for RequestFromFriendContract {
    fn name(&self) -> &'static str {
        "request-from-friend"
    }

    fn description(&self) -> &'static str {
        "Request a mosaic from a friend, who approves by cosigning"
    }

    async fn execute(
        &self,
        ctx: &ContractContext,
        params: &dyn ParameterResolver,
    ) -> DscResult<Outcome> {
        let friend: Ed25519PublicKey = resolve_parsed(params, "friend", None, "Friend public key")?;
        let me = ctx.public_key();
        if friend == me {
            return Err(DscError::parameter("friend", "must be another account"));
        }
        let currency = currency_default(ctx);
        let mosaic = parse_mosaic_ref(
            "mosaic",
            &params.resolve("mosaic", Some(&currency), "Requested mosaic")?,
        )?;
        let amount: u64 = resolve_parsed(
            params,
            "amount",
            None,
            "Requested amount (atomic units)",
        )?;
        if amount == 0 {
            return Err(DscError::parameter("amount", "must be positive"));
        }
        let message = params.resolve(
            "message",
            Some(DEFAULT_REQUEST_MESSAGE),
            "Message to your friend",
        )?;
        let lock = resolve_lock(ctx, params)?;

        let friend_address = Address::from_public_key(&friend.to_bytes(), ctx.network());
        let factory = ctx.factory();
        let transactions = vec![
            factory.embed(
                me,
                TransactionKind::Transfer {
                    recipient: friend_address,
                    mosaics: Vec::new(),
                    message: Some(message),
                },
            )?,
            factory.embed(
                friend,
                TransactionKind::Transfer {
                    recipient: ctx.address(),
                    mosaics: vec![Mosaic::new(mosaic, amount)],
                    message: None,
                },
            )?,
        ];

        ctx.announce_bonded(transactions, lock).await
    }
}
