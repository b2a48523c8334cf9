use crate::broadcast::Outcome;
use crate::contract::params::{parse_bool, resolve_parsed};
use crate::contract::{Contract, ContractContext, ParameterResolver};
use crate::error::{DscError, DscResult};
use crate::types::Hash256;
use async_trait::async_trait;

/// Cosigns a bonded aggregate waiting in the node's partial cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosignContract;

#[async_trait]
impl Contract for CosignContract {
    fn name(&self) -> &'static str {
        "cosign"
    }

    fn description(&self) -> &'static str {
        "Cosign a pending bonded aggregate by hash"
    }

    async fn execute(
        &self,
        ctx: &ContractContext,
        params: &dyn ParameterResolver,
    ) -> DscResult<Outcome> {
        let hash: Hash256 = resolve_parsed(
            params,
            "hash",
            None,
            "Hash of the aggregate to cosign",
        )?;
        let check = params.resolve("checkPending", Some("yes"), "Check the aggregate is pending?")?;

        if parse_bool("checkPending", &check)? && !ctx.lookup().partial_exists(hash).await? {
            return Err(DscError::NotFound(format!(
                "no pending bonded aggregate with hash {hash}"
            )));
        }
        ctx.announce_cosignature(hash).await
    }
}
