//! Parameter collection: values given up front, then interactive prompts.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use dsc_sdk::contract::{ParameterResolver, StaticResolver};
use dsc_sdk::{DscError, DscResult};

/// Answers from `--param` and the config file first, then asks the user.
#[derive(Debug)]
pub struct PromptResolver {
    values: StaticResolver,
    interactive: bool,
}

impl PromptResolver {
    pub fn new(values: StaticResolver, interactive: bool) -> Self {
        Self {
            values,
            interactive,
        }
    }

    fn missing(name: &str) -> DscError {
        DscError::parameter(name, format!("missing value (pass --param {name}=<value>)"))
    }
}

impl ParameterResolver for PromptResolver {
    fn resolve(&self, name: &str, default: Option<&str>, prompt: &str) -> DscResult<String> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.to_string());
        }
        if !self.interactive {
            return default.map(ToString::to_string).ok_or_else(|| Self::missing(name));
        }

        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);
        match default {
            Some("") => input = input.allow_empty(true),
            Some(value) => input = input.default(value.to_string()),
            None => {}
        }
        input
            .interact_text()
            .map_err(|e| DscError::parameter(name, e.to_string()))
    }

    fn resolve_secret(&self, name: &str, prompt: &str) -> DscResult<String> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.to_string());
        }
        if !self.interactive {
            return Err(Self::missing(name));
        }
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .interact()
            .map_err(|e| DscError::parameter(name, e.to_string()))
    }
}
