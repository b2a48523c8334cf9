//! Contract parameter resolution.

use crate::error::{DscError, DscResult};
use crate::types::{MosaicId, NamespaceId, UnresolvedMosaicId};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// Supplies contract parameters by name.
///
/// Implementations may read flags, configuration files or ask the user.
pub trait ParameterResolver: Send + Sync {
    /// Returns the value of `name`, falling back to `default`.
    ///
    /// `prompt` is the question shown to a user when the value is asked for
    /// interactively.
    fn resolve(&self, name: &str, default: Option<&str>, prompt: &str) -> DscResult<String>;

    /// Returns a value that must not be echoed, such as a private key.
    fn resolve_secret(&self, name: &str, prompt: &str) -> DscResult<String>;
}

/// Resolves parameters from a fixed map and never asks.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    values: HashMap<String, String>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Looks up a value without applying defaults.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for StaticResolver {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl ParameterResolver for StaticResolver {
    fn resolve(&self, name: &str, default: Option<&str>, _prompt: &str) -> DscResult<String> {
        self.get(name)
            .or(default)
            .map(ToString::to_string)
            .ok_or_else(|| DscError::parameter(name, "missing value"))
    }

    fn resolve_secret(&self, name: &str, _prompt: &str) -> DscResult<String> {
        self.get(name)
            .map(ToString::to_string)
            .ok_or_else(|| DscError::parameter(name, "missing value"))
    }
}

/// Parses `value` as a `T`, blaming parameter `name` on failure.
pub fn parse_param<T>(name: &str, value: &str) -> DscResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| DscError::parameter(name, e.to_string()))
}

/// Parses yes/no style answers.
pub fn parse_bool(name: &str, value: &str) -> DscResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(DscError::parameter(name, format!("expected yes or no, got '{other}'"))),
    }
}

/// Parses a mosaic reference: a hex mosaic id (`0x` prefixed or 16 digits)
/// or a namespace alias such as `symbol.xym`.
pub fn parse_mosaic_ref(name: &str, value: &str) -> DscResult<UnresolvedMosaicId> {
    let value = value.trim();
    let digits = value.trim_start_matches("0x").replace('\'', "");
    let looks_like_id = value.starts_with("0x")
        || (digits.len() == 16 && digits.chars().all(|c| c.is_ascii_hexdigit()));

    if looks_like_id {
        return parse_param::<MosaicId>(name, value).map(UnresolvedMosaicId::from);
    }
    NamespaceId::from_full_name(value)
        .map(UnresolvedMosaicId::from)
        .map_err(|e| DscError::parameter(name, e.to_string()))
}

/// Resolves `name` and parses it.
pub(crate) fn resolve_parsed<T>(
    params: &dyn ParameterResolver,
    name: &str,
    default: Option<&str>,
    prompt: &str,
) -> DscResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = params.resolve(name, default, prompt)?;
    parse_param(name, &value)
}

/// Resolves a yes/no parameter.
pub(crate) fn resolve_bool(
    params: &dyn ParameterResolver,
    name: &str,
    default: bool,
    prompt: &str,
) -> DscResult<bool> {
    let default = if default { "yes" } else { "no" };
    let value = params.resolve(name, Some(default), prompt)?;
    parse_bool(name, &value)
}

/// Resolves a parameter that may be left empty.
pub(crate) fn resolve_optional(
    params: &dyn ParameterResolver,
    name: &str,
    prompt: &str,
) -> DscResult<Option<String>> {
    let value = params.resolve(name, Some(""), prompt)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}
