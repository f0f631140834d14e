use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the provider settings store.
///
/// A malformed settings file is not an error: it is logged and treated
/// as absent.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unknown provider '{provider}' (known: {known})")]
    UnknownProvider { provider: String, known: String },

    #[error("No token provided for '{provider}' and no existing token to keep")]
    NoTokenProvided { provider: String },

    #[error("Failed to write settings '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock settings directory '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Model name must not be empty")]
    EmptyModelName,

    /// `scope` is either a provider id or "any provider".
    #[error("Unknown model '{model}' for {scope}")]
    UnknownModel { model: String, scope: String },

    #[error("Provider '{provider}' is not configured; run `claude-switch configure {provider}`")]
    NotConfigured { provider: String },
}

impl SettingsError {
    pub(crate) fn unknown_provider(provider: &str) -> Self {
        Self::UnknownProvider {
            provider: provider.to_string(),
            known: super::registry::known_ids().join(", "),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownProvider { .. } | Self::UnknownModel { .. } => 2,
            Self::NoTokenProvided { .. } | Self::NotConfigured { .. } => 3,
            Self::Write { .. } | Self::Lock { .. } | Self::Serialize(_) => 4,
            Self::EmptyModelName => 1,
        }
    }
}
