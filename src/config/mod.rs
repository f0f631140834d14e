//! Tool configuration: TOML defaults and credential types.

mod credentials;
mod loader;
mod types;

pub use credentials::{mask_secret, AuthKeyName, SecureString};
pub use loader::ConfigError;
pub use types::{Config, Defaults, ProviderOverride};

pub(crate) use types::default_api_timeout_ms;
