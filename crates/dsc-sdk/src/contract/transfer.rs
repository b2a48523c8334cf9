use crate::broadcast::Outcome;
use crate::contract::params::{parse_mosaic_ref, resolve_optional, resolve_parsed};
use crate::contract::{currency_default, Contract, ContractContext, ParameterResolver};
use crate::error::DscResult;
use crate::transaction::TransactionKind;
use crate::types::{Address, Mosaic};
use async_trait::async_trait;

/// Sends one mosaic, optionally with a message, in a plain transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferContract;

#[async_trait]
impl Contract for TransferContract {
    fn name(&self) -> &'static str {
        "transfer"
    }

    fn description(&self) -> &'static str {
        "Send a mosaic to another account"
    }

    async fn execute(
        &self,
        ctx: &ContractContext,
        params: &dyn ParameterResolver,
    ) -> DscResult<Outcome> {
        let recipient: Address = resolve_parsed(params, "recipient", None, "Recipient address")?;
        let currency = currency_default(ctx);
        let mosaic = parse_mosaic_ref(
            "mosaic",
            &params.resolve("mosaic", Some(&currency), "Mosaic id or alias")?,
        )?;
        let amount: u64 = resolve_parsed(params, "amount", None, "Amount (atomic units)")?;
        let message = resolve_optional(params, "message", "Message (optional)")?;

        let mosaics = if amount > 0 {
            vec![Mosaic::new(mosaic, amount)]
        } else {
            Vec::new()
        };

        ctx.announce_single(TransactionKind::Transfer {
            recipient,
            mosaics,
            message,
        })
        .await
    }
}
