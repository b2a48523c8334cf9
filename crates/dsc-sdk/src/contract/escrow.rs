use crate::broadcast::Outcome;
use crate::contract::params::{parse_mosaic_ref, resolve_parsed};
use crate::contract::{currency_default, resolve_lock, Contract, ContractContext, ParameterResolver};
use crate::crypto::Ed25519PublicKey;
use crate::error::{DscError, DscResult};
use crate::transaction::TransactionKind;
use crate::types::{Address, Mosaic};
use async_trait::async_trait;

/// Swaps one asset for another with a counterparty, atomically.
///
/// Both transfers live in one bonded aggregate, so neither happens until the
/// counterparty cosigns.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscrowContract;

#[async_trait]
impl Contract for EscrowContract {
    fn name(&self) -> &'static str {
        "escrow"
    }

    fn description(&self) -> &'static str {
        "Exchange mosaics with another account once it cosigns"
    }

    async fn execute(
        &self,
        ctx: &ContractContext,
        params: &dyn ParameterResolver,
    ) -> DscResult<Outcome> {
        let counterparty: Ed25519PublicKey =
            resolve_parsed(params, "counterparty", None, "Counterparty public key")?;
        let me = ctx.public_key();
        if counterparty == me {
            return Err(DscError::parameter("counterparty", "must be another account"));
        }
        let currency = currency_default(ctx);
        let give_mosaic = parse_mosaic_ref(
            "giveMosaic",
            &params.resolve("giveMosaic", Some(&currency), "Mosaic you give")?,
        )?;
        let give_amount: u64 = resolve_parsed(
            params,
            "giveAmount",
            None,
            "Amount you give (atomic units)",
        )?;
        let receive_mosaic = parse_mosaic_ref(
            "receiveMosaic",
            &params.resolve("receiveMosaic", None, "Mosaic you receive")?,
        )?;
        let receive_amount: u64 =
            resolve_parsed(params, "receiveAmount", None, "Amount you receive (atomic units)")?;
        let lock = resolve_lock(ctx, params)?;

        let counterparty_address = Address::from_public_key(
            &counterparty.to_bytes(),
            ctx.network(),
        );
        let factory = ctx.factory();
        let transactions = vec![
            factory.embed(
                me,
                TransactionKind::Transfer {
                    recipient: counterparty_address,
                    mosaics: vec![Mosaic::new(give_mosaic, give_amount)],
                    message: None,
                },
            )?,
            factory.embed(
                counterparty,
                TransactionKind::Transfer {
                    recipient: ctx.address(),
                    mosaics: vec![Mosaic::new(receive_mosaic, receive_amount)],
                    message: None,
                },
            )?,
        ];

        ctx.announce_bonded(transactions, lock).await
    }
}
