//! Environment builder: every variable handed to Claude Code in one place.

use crate::provider::fields;
use crate::provider::ProviderConfig;

/// Builder for environment variables passed to the launched process.
#[derive(Debug, Clone)]
pub struct EnvSet {
    vars: Vec<(String, String)>,
}

impl EnvSet {
    /// Create an empty environment set.
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// The provider's full settings bundle.
    pub fn with_provider(mut self, config: &ProviderConfig, api_timeout_ms: u64) -> Self {
        self.vars.extend(config.env_vars(api_timeout_ms));
        self
    }

    /// Pin the active model (main, sonnet, opus and subagent slots).
    pub fn with_model(mut self, model: &str) -> Self {
        for key in [
            fields::MODEL,
            fields::DEFAULT_SONNET_MODEL,
            fields::DEFAULT_OPUS_MODEL,
            fields::SUBAGENT_MODEL,
        ] {
            self.set(key, model);
        }
        self
    }

    /// Add arbitrary extra environment variables.
    pub fn with_extra(mut self, extra: Vec<(String, String)>) -> Self {
        for (key, value) in extra {
            self.set(&key, &value);
        }
        self
    }

    /// Build the final environment variable list.
    pub fn build(self) -> Vec<(String, String)> {
        self.vars
    }

    /// Replace in place so the bundle keeps its order; append if new.
    fn set(&mut self, key: &str, value: &str) {
        match self.vars.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.vars.push((key.to_string(), value.to_string())),
        }
    }
}

impl Default for EnvSet {
    fn default() -> Self {
        Self::new()
    }
}
