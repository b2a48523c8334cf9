use crate::broadcast::Outcome;
use crate::contract::namespace::DEFAULT_NAMESPACE_DURATION;
use crate::contract::params::{resolve_bool, resolve_optional, resolve_parsed};
use crate::contract::{Contract, ContractContext, ParameterResolver};
use crate::error::{DscError, DscResult};
use crate::transaction::{AliasAction, SupplyChangeAction, TransactionKind};
use crate::types::{MosaicFlags, MosaicId, NamespaceId};
use async_trait::async_trait;
use tracing::debug;

/// Defines a mosaic, mints its initial supply and optionally names it.
///
/// Missing levels of the name are registered in the same complete aggregate
/// before the alias is linked.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateMosaicContract;

#[async_trait]
impl Contract for CreateMosaicContract {
    fn name(&self) -> &'static str {
        "create-mosaic"
    }

    fn description(&self) -> &'static str {
        "Create a mosaic with an initial supply and an optional namespace alias"
    }

    async fn execute(
        &self,
        ctx: &ContractContext,
        params: &dyn ParameterResolver,
    ) -> DscResult<Outcome> {
        let supply: u64 = resolve_parsed(
            params,
            "supply",
            Some("1000000"),
            "Initial supply (atomic units)",
        )?;
        let divisibility: u8 = resolve_parsed(
            params,
            "divisibility",
            Some("0"),
            "Divisibility (0-6)",
        )?;
        if divisibility > 6 {
            return Err(DscError::parameter("divisibility", "must be between 0 and 6"));
        }
        let duration: u64 = resolve_parsed(
            params,
            "duration",
            Some("0"),
            "Duration in blocks (0 = eternal)",
        )?;
        let flags = MosaicFlags {
            supply_mutable: resolve_bool(params, "supplyMutable", true, "Supply mutable?")?,
            transferable: resolve_bool(params, "transferable", true, "Transferable?")?,
            restrictable: resolve_bool(params, "restrictable", false, "Restrictable?")?,
            revokable: resolve_bool(params, "revokable", false, "Revokable?")?,
        };
        let random_nonce = rand::random::<u32>().to_string();
        let nonce: u32 = resolve_parsed(params, "nonce", Some(&random_nonce), "Nonce")?;
        let name = resolve_optional(params, "name", "Namespace alias (optional)")?;

        let signer = ctx.public_key();
        let factory = ctx.factory();
        let mosaic_id = MosaicId::from_nonce(&ctx.address(), nonce);
        debug!(%mosaic_id, nonce, "defining mosaic");

        let mut transactions = vec![
            factory.embed(
                signer,
                TransactionKind::MosaicDefinition {
                    nonce,
                    flags,
                    divisibility,
                    duration,
                },
            )?,
            factory.embed(
                signer,
                TransactionKind::MosaicSupplyChange {
                    mosaic_id: mosaic_id.into(),
                    action: SupplyChangeAction::Increase,
                    delta: supply,
                },
            )?,
        ];

        if let Some(name) = name {
            let namespace_duration: u64 = resolve_parsed(
                params,
                "namespaceDuration",
                Some(DEFAULT_NAMESPACE_DURATION),
                "Namespace rental duration (blocks)",
            )?;
            let path = NamespaceId::path(&name)?;
            let mut parent = None;
            for (level, id) in name.split('.').zip(path.iter().copied()) {
                if !ctx.lookup().namespace_exists(id).await? {
                    debug!(namespace = level, %id, "registering missing namespace level");
                    let kind = match parent {
                        Some(parent) => TransactionKind::ChildNamespace {
                            name: level.to_string(),
                            parent,
                        },
                        None => TransactionKind::RootNamespace {
                            name: level.to_string(),
                            duration: namespace_duration,
                        },
                    };
                    transactions.push(factory.embed(signer, kind)?);
                }
                parent = Some(id);
            }

            let namespace_id = path
                .last()
                .copied()
                .ok_or_else(|| DscError::parameter("name", "empty namespace name"))?;
            transactions.push(factory.embed(
                signer,
                TransactionKind::MosaicAlias {
                    namespace_id,
                    mosaic_id,
                    action: AliasAction::Link,
                },
            )?);
        }

        ctx.announce_aggregate(transactions).await
    }
}
