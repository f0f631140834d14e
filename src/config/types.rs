use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    /// Per-provider overrides of the built-in defaults, keyed by provider id.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderOverride>,
}

/// Default settings for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Claude Code executable to launch (default: "claude").
    #[serde(default = "default_command")]
    pub command: String,
    /// Value written to `API_TIMEOUT_MS` (default: 3000000).
    #[serde(default = "default_api_timeout_ms")]
    pub api_timeout_ms: u64,
    /// Directory holding provider settings files.
    /// Falls back to the config directory when unset.
    #[serde(default)]
    pub settings_dir: Option<PathBuf>,
}

/// Optional replacement for a provider's baked-in endpoint or model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOverride {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

fn default_command() -> String {
    "claude".to_string()
}

pub(crate) fn default_api_timeout_ms() -> u64 {
    3_000_000
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            command: default_command(),
            api_timeout_ms: default_api_timeout_ms(),
            settings_dir: None,
        }
    }
}
