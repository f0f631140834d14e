//! The per-provider settings document and its `env` bundle.

use serde::de::Error as _;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::registry::ProviderDef;
use crate::config::{AuthKeyName, SecureString};

pub const BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const API_TIMEOUT_MS: &str = "API_TIMEOUT_MS";
pub const MODEL: &str = "ANTHROPIC_MODEL";
pub const SMALL_FAST_MODEL: &str = "ANTHROPIC_SMALL_FAST_MODEL";
pub const DEFAULT_SONNET_MODEL: &str = "ANTHROPIC_DEFAULT_SONNET_MODEL";
pub const DEFAULT_OPUS_MODEL: &str = "ANTHROPIC_DEFAULT_OPUS_MODEL";
pub const DEFAULT_HAIKU_MODEL: &str = "ANTHROPIC_DEFAULT_HAIKU_MODEL";
pub const SUBAGENT_MODEL: &str = "CLAUDE_CODE_SUBAGENT_MODEL";
pub const AVAILABLE_MODELS: &str = "CLAUDE_CODE_AVAILABLE_MODELS";

/// Resolved settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider_id: String,
    pub base_url: String,
    pub model_name: String,
    pub small_fast_model: String,
    pub auth_key_name: AuthKeyName,
    pub auth_token: SecureString,
    pub available_models: Vec<String>,
}

impl ProviderConfig {
    /// Config carrying the provider's baked-in defaults.
    pub fn from_def(def: &ProviderDef, auth_token: SecureString) -> Self {
        Self {
            provider_id: def.id.to_string(),
            base_url: def.base_url.to_string(),
            model_name: def.model.to_string(),
            small_fast_model: def.small_fast_model.to_string(),
            auth_key_name: def.auth_key,
            auth_token,
            available_models: def.available_models.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// The env bundle in document order.
    pub fn env_vars(&self, api_timeout_ms: u64) -> Vec<(String, String)> {
        let pairs = [
            (BASE_URL, self.base_url.clone()),
            (self.auth_key_name.as_str(), self.auth_token.expose().to_string()),
            (API_TIMEOUT_MS, api_timeout_ms.to_string()),
            (MODEL, self.model_name.clone()),
            (SMALL_FAST_MODEL, self.small_fast_model.clone()),
            (DEFAULT_SONNET_MODEL, self.model_name.clone()),
            (DEFAULT_OPUS_MODEL, self.model_name.clone()),
            (DEFAULT_HAIKU_MODEL, self.small_fast_model.clone()),
            (SUBAGENT_MODEL, self.model_name.clone()),
            (AVAILABLE_MODELS, self.available_models.join(",")),
        ];
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }

    /// Pretty-printed settings document.
    pub fn render(&self, api_timeout_ms: u64) -> Result<String, serde_json::Error> {
        let env: Map<String, Value> = self
            .env_vars(api_timeout_ms)
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        let mut root = Map::new();
        root.insert("env".to_string(), Value::Object(env));
        serde_json::to_string_pretty(&Value::Object(root))
    }
}

/// A parsed settings file. Only the `env` mapping is interpreted.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsDocument {
    #[serde(default)]
    env: Map<String, Value>,
}

impl SettingsDocument {
    /// Strict parse. A non-object root or `env` is an error.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(content)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom("settings root must be an object"));
        }
        serde_json::from_value(value)
    }

    /// Value of an `env` field. Empty strings, null and nested values
    /// count as absent; other scalars are rendered as text.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.env.get(name)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Stored credential, following `AuthKeyName::READ_PRECEDENCE`.
    pub fn token(&self) -> Option<(AuthKeyName, String)> {
        AuthKeyName::READ_PRECEDENCE
            .iter()
            .find_map(|key| self.field(key.as_str()).map(|token| (*key, token)))
    }

    /// Rebuild a config, filling gaps from the provider's defaults.
    /// Returns `None` when no credential is stored.
    pub fn to_config(&self, def: &ProviderDef) -> Option<ProviderConfig> {
        let (auth_key_name, token) = self.token()?;
        let mut config = ProviderConfig::from_def(def, SecureString::new(token));
        config.auth_key_name = auth_key_name;

        if let Some(base_url) = self.field(BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(model) = self.field(MODEL) {
            config.model_name = model;
        }
        if let Some(small) = self.field(SMALL_FAST_MODEL) {
            config.small_fast_model = small;
        }
        if let Some(models) = self.field(AVAILABLE_MODELS) {
            let parsed: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
            if !parsed.is_empty() {
                config.available_models = parsed;
            }
        }
        Some(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::registry;

    fn kimi_config(token: &str) -> ProviderConfig {
        let def = registry::find("kimi").unwrap();
        ProviderConfig::from_def(def, SecureString::new(token.to_string()))
    }

    #[test]
    fn render_keeps_documented_key_order() {
        let rendered = kimi_config("sk-abc").render(3_000_000).unwrap();
        let order = [
            BASE_URL,
            "ANTHROPIC_API_KEY",
            API_TIMEOUT_MS,
            MODEL,
            SMALL_FAST_MODEL,
            DEFAULT_SONNET_MODEL,
            DEFAULT_OPUS_MODEL,
            DEFAULT_HAIKU_MODEL,
            SUBAGENT_MODEL,
            AVAILABLE_MODELS,
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|key| rendered.find(&format!("\"{key}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{rendered}");
    }

    #[test]
    fn timeout_is_string_encoded() {
        let rendered = kimi_config("sk-abc").render(42).unwrap();
        assert!(rendered.contains("\"API_TIMEOUT_MS\": \"42\""));
    }

    #[test]
    fn available_models_are_comma_joined() {
        let doc = SettingsDocument::parse(&kimi_config("sk-abc").render(1).unwrap()).unwrap();
        assert_eq!(
            doc.field(AVAILABLE_MODELS).as_deref(),
            Some("kimi-k2-turbo-preview,kimi-k2-0905-preview")
        );
    }

    #[test]
    fn token_prefers_api_key_over_auth_token() {
        let doc = SettingsDocument::parse(
            r#"{"env": {"ANTHROPIC_AUTH_TOKEN": "from-auth", "ANTHROPIC_API_KEY": "from-key"}}"#,
        )
        .unwrap();
        assert_eq!(
            doc.token(),
            Some((AuthKeyName::ApiKey, "from-key".to_string()))
        );
    }

    #[test]
    fn empty_api_key_falls_through_to_auth_token() {
        let doc = SettingsDocument::parse(
            r#"{"env": {"ANTHROPIC_API_KEY": "", "ANTHROPIC_AUTH_TOKEN": "tok"}}"#,
        )
        .unwrap();
        assert_eq!(doc.token(), Some((AuthKeyName::AuthToken, "tok".to_string())));
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(SettingsDocument::parse("[]").is_err());
        assert!(SettingsDocument::parse("[1, 2]").is_err());
        assert!(SettingsDocument::parse(r#"{"env": "nope"}"#).is_err());
    }

    #[test]
    fn missing_env_is_empty() {
        let doc = SettingsDocument::parse(r#"{"other": 1}"#).unwrap();
        assert_eq!(doc.field(BASE_URL), None);
        assert_eq!(doc.token(), None);
    }

    #[test]
    fn to_config_restores_written_values() {
        let mut config = kimi_config("sk-abcdef123");
        config.model_name = "kimi-k2-0905-preview".to_string();
        let doc = SettingsDocument::parse(&config.render(1).unwrap()).unwrap();
        let def = registry::find("kimi").unwrap();
        assert_eq!(doc.to_config(def), Some(config));
    }
}
