//! Provider settings store.
//!
//! One JSON file per known provider under `<root>/providers/`, plus the
//! shared `<root>/settings.json` carrying the default model. Writes go
//! through a temp file and an advisory lock; reads never fail on a
//! malformed file.

mod document;
mod error;
mod fs;
pub mod registry;
mod shared;
mod store;

pub use document::{ProviderConfig, SettingsDocument};
pub use error::SettingsError;
pub use registry::ProviderDef;
pub use shared::{DefaultTarget, PLAIN_DEFAULT};
pub use store::{
    carry_forward_on_empty_input, ConfigureOutcome, ConfigureRequest, ProviderSettingsStore,
    ProviderStatus, TokenSource,
};

/// Names of the `env` fields in a provider settings document.
pub mod fields {
    pub use super::document::{
        API_TIMEOUT_MS, AVAILABLE_MODELS, BASE_URL, DEFAULT_HAIKU_MODEL, DEFAULT_OPUS_MODEL,
        DEFAULT_SONNET_MODEL, MODEL, SMALL_FAST_MODEL, SUBAGENT_MODEL,
    };
}
