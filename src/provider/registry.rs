//! Built-in provider definitions.
//!
//! Adding a provider: add one `ProviderDef` to `BUILTIN`. The `id` is used
//! as the settings file name, so once published it must not be renamed.

use crate::config::AuthKeyName;

/// A stale endpoint that is rewritten to the provider's current default.
#[derive(Debug)]
pub struct LegacyEndpoint {
    /// Substring identifying the deprecated endpoint.
    pub deprecated: &'static str,
}

/// Self-contained definition of a known provider.
#[derive(Debug)]
pub struct ProviderDef {
    pub id: &'static str,
    pub display_name: &'static str,
    pub base_url: &'static str,
    /// Active model (sonnet/opus/subagent slots).
    pub model: &'static str,
    /// Model for the haiku and small-fast slots.
    pub small_fast_model: &'static str,
    pub auth_key: AuthKeyName,
    /// Every selectable variant, active default first.
    pub available_models: &'static [&'static str],
    pub legacy_endpoint: Option<LegacyEndpoint>,
}

impl ProviderDef {
    /// Replace a deprecated endpoint with the current default.
    ///
    /// Returns `None` when `base_url` is not stale.
    pub fn migrate_base_url(&self, base_url: &str) -> Option<&'static str> {
        let legacy = self.legacy_endpoint.as_ref()?;
        base_url
            .contains(legacy.deprecated)
            .then_some(self.base_url)
    }

    pub fn offers_model(&self, model: &str) -> bool {
        self.available_models.iter().any(|m| *m == model)
    }
}

static BUILTIN: &[ProviderDef] = &[
    ProviderDef {
        id: "glm",
        display_name: "GLM (Zhipu)",
        base_url: "https://open.bigmodel.cn/api/anthropic",
        model: "glm-4.6",
        small_fast_model: "glm-4.5-air",
        auth_key: AuthKeyName::AuthToken,
        available_models: &["glm-4.6", "glm-4.5-air"],
        legacy_endpoint: None,
    },
    ProviderDef {
        id: "kimi",
        display_name: "Kimi (Moonshot)",
        base_url: "https://api.moonshot.cn/anthropic",
        model: "kimi-k2-turbo-preview",
        small_fast_model: "kimi-k2-turbo-preview",
        auth_key: AuthKeyName::ApiKey,
        available_models: &["kimi-k2-turbo-preview", "kimi-k2-0905-preview"],
        // OpenAI-compatible endpoint; Claude Code cannot talk to it.
        legacy_endpoint: Some(LegacyEndpoint {
            deprecated: "api.moonshot.cn/v1",
        }),
    },
    ProviderDef {
        id: "deepseek",
        display_name: "DeepSeek",
        base_url: "https://api.deepseek.com/anthropic",
        model: "deepseek-chat",
        small_fast_model: "deepseek-chat",
        auth_key: AuthKeyName::AuthToken,
        available_models: &["deepseek-chat", "deepseek-reasoner"],
        legacy_endpoint: None,
    },
    ProviderDef {
        id: "qwen",
        display_name: "Qwen (DashScope)",
        base_url: "https://dashscope.aliyuncs.com/apps/anthropic",
        model: "qwen3-coder-plus",
        small_fast_model: "qwen3-coder-flash",
        auth_key: AuthKeyName::AuthToken,
        available_models: &["qwen3-coder-plus", "qwen3-coder-flash"],
        legacy_endpoint: None,
    },
    ProviderDef {
        id: "minimax",
        display_name: "MiniMax",
        base_url: "https://api.minimaxi.com/anthropic",
        model: "MiniMax-M2",
        small_fast_model: "MiniMax-M2",
        auth_key: AuthKeyName::AuthToken,
        available_models: &["MiniMax-M2"],
        legacy_endpoint: None,
    },
];

/// All known providers in display order.
pub fn all() -> &'static [ProviderDef] {
    BUILTIN
}

/// Look up a provider by id. Unknown ids return `None`.
pub fn find(id: &str) -> Option<&'static ProviderDef> {
    BUILTIN.iter().find(|def| def.id == id)
}

pub fn known_ids() -> Vec<&'static str> {
    BUILTIN.iter().map(|def| def.id).collect()
}

/// Provider offering `model` as one of its variants.
pub fn find_by_model(model: &str) -> Option<&'static ProviderDef> {
    BUILTIN.iter().find(|def| def.offers_model(model))
}

/// Provider that owns `name`, either as its id or as one of its models.
pub fn find_by_id_or_model(name: &str) -> Option<&'static ProviderDef> {
    find(name).or_else(|| find_by_model(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids = known_ids();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn default_model_is_first_available() {
        for def in all() {
            assert_eq!(def.available_models.first(), Some(&def.model), "{}", def.id);
            assert!(def.offers_model(def.small_fast_model), "{}", def.id);
        }
    }

    #[test]
    fn kimi_migrates_openai_endpoint() {
        let kimi = find("kimi").unwrap();
        assert_eq!(
            kimi.migrate_base_url("https://api.moonshot.cn/v1"),
            Some("https://api.moonshot.cn/anthropic")
        );
        assert_eq!(kimi.migrate_base_url("https://proxy.example.com"), None);
    }

    #[test]
    fn providers_without_legacy_endpoint_never_migrate() {
        let glm = find("glm").unwrap();
        assert_eq!(glm.migrate_base_url("https://api.moonshot.cn/v1"), None);
    }

    #[test]
    fn find_by_model_resolves_variant() {
        assert_eq!(find_by_id_or_model("glm-4.5-air").map(|d| d.id), Some("glm"));
        assert_eq!(find_by_id_or_model("kimi").map(|d| d.id), Some("kimi"));
        assert!(find_by_id_or_model("gpt-5").is_none());
    }

    #[test]
    fn find_by_model_ignores_provider_ids() {
        assert_eq!(find_by_model("deepseek-reasoner").map(|d| d.id), Some("deepseek"));
        assert!(find_by_model("glm").is_none());
    }
}
