use crate::broadcast::Outcome;
use crate::contract::params::resolve_parsed;
use crate::contract::{Contract, ContractContext, ParameterResolver};
use crate::error::DscResult;
use async_trait::async_trait;

/// Minimum rental of a root namespace, in blocks.
pub(crate) const DEFAULT_NAMESPACE_DURATION: &str = "86400";

/// Registers a root namespace, or a child under an existing parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateNamespaceContract;

#[async_trait]
impl Contract for CreateNamespaceContract {
    fn name(&self) -> &'static str {
        "create-namespace"
    }

    fn description(&self) -> &'static str {
        "Register a namespace (use parent.child for a subnamespace)"
    }

    async fn execute(
        &self,
        ctx: &ContractContext,
        params: &dyn ParameterResolver,
    ) -> DscResult<Outcome> {
        let name = params.resolve("name", None, "Namespace name")?;
        let name = name.trim().to_string();
        let duration: u64 = resolve_parsed(
            params,
            "duration",
            Some(DEFAULT_NAMESPACE_DURATION),
            "Rental duration (blocks)",
        )?;

        let registration = ctx
            .factory()
            .namespace_registration_checked(ctx.lookup(), ctx.public_key(), &name, duration)
            .await?;
        ctx.announce_aggregate(vec![registration]).await
    }
}
