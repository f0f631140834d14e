//! Credential handling for provider settings.
//!
//! Tokens are carried in a [`SecureString`] so they never reach logs or
//! terminal output in full.

use serde::{Deserialize, Serialize};

/// Env var under which a provider expects its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthKeyName {
    #[serde(rename = "ANTHROPIC_AUTH_TOKEN")]
    AuthToken,
    #[serde(rename = "ANTHROPIC_API_KEY")]
    ApiKey,
}

impl AuthKeyName {
    /// Order in which stored credentials are looked up.
    /// `ANTHROPIC_API_KEY` wins when a file carries both.
    pub const READ_PRECEDENCE: [AuthKeyName; 2] = [AuthKeyName::ApiKey, AuthKeyName::AuthToken];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthToken => "ANTHROPIC_AUTH_TOKEN",
            Self::ApiKey => "ANTHROPIC_API_KEY",
        }
    }

    /// Parse from the env var name. Unknown names return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ANTHROPIC_AUTH_TOKEN" => Some(Self::AuthToken),
            "ANTHROPIC_API_KEY" => Some(Self::ApiKey),
            _ => None,
        }
    }

    /// True if `field` names any credential key.
    pub fn is_credential_field(field: &str) -> bool {
        Self::parse(field).is_some()
    }
}

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when writing settings.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

/// Characters of a secret that may be shown.
const PREVIEW_CHARS: usize = 4;

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short prefix safe for display, e.g. `sk-a…`.
    pub fn preview(&self) -> String {
        mask_secret(&self.0)
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Mask a secret down to its first few characters.
///
/// Secrets too short to leave anything hidden are fully masked.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= PREVIEW_CHARS * 2 {
        return "••••".to_string();
    }
    let prefix: String = secret.chars().take(PREVIEW_CHARS).collect();
    format!("{prefix}…")
}
