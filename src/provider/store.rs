//! Durable mapping from provider id to its settings file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::document::{ProviderConfig, SettingsDocument, BASE_URL};
use super::error::SettingsError;
use super::fs::{write_private, SettingsLock};
use super::registry::{self, ProviderDef};
use crate::config::{default_api_timeout_ms, Config, ProviderOverride, SecureString};

const PROVIDERS_DIR: &str = "providers";

/// Arguments to [`ProviderSettingsStore::configure`].
///
/// `None` or empty fields fall back to stored or default values.
#[derive(Debug, Clone, Default)]
pub struct ConfigureRequest {
    pub provider_id: String,
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl ConfigureRequest {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            ..Self::default()
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Where the written token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Provided,
    CarriedForward,
}

/// Result of a successful configure.
#[derive(Debug, Clone)]
pub struct ConfigureOutcome {
    pub path: PathBuf,
    pub token_source: TokenSource,
    /// True when a deprecated endpoint was replaced.
    pub migrated_base_url: bool,
    pub config: ProviderConfig,
}

/// One row of [`ProviderSettingsStore::status`].
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub provider_id: &'static str,
    pub display_name: &'static str,
    pub path: PathBuf,
    /// Stored config, `None` when unconfigured.
    pub config: Option<ProviderConfig>,
}

/// Store of per-provider settings files under one root directory.
#[derive(Debug, Clone)]
pub struct ProviderSettingsStore {
    root: PathBuf,
    api_timeout_ms: u64,
    overrides: BTreeMap<String, ProviderOverride>,
}

impl ProviderSettingsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            api_timeout_ms: default_api_timeout_ms(),
            overrides: BTreeMap::new(),
        }
    }

    /// Store rooted at the configured settings directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.settings_dir())
            .with_api_timeout_ms(config.defaults.api_timeout_ms)
            .with_overrides(config.providers.clone())
    }

    pub fn with_api_timeout_ms(mut self, api_timeout_ms: u64) -> Self {
        self.api_timeout_ms = api_timeout_ms;
        self
    }

    pub fn with_overrides(mut self, overrides: BTreeMap<String, ProviderOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn api_timeout_ms(&self) -> u64 {
        self.api_timeout_ms
    }

    /// Settings file path for a known provider.
    pub fn resolve_path(&self, provider_id: &str) -> Result<PathBuf, SettingsError> {
        let def = lookup(provider_id)?;
        Ok(self.path_for(def))
    }

    /// Stored token, `ANTHROPIC_API_KEY` first, then `ANTHROPIC_AUTH_TOKEN`.
    pub fn read_existing_token(&self, provider_id: &str) -> Result<Option<String>, SettingsError> {
        let def = lookup(provider_id)?;
        Ok(self
            .read_document(def)
            .and_then(|doc| doc.token())
            .map(|(_, token)| token))
    }

    /// Any field under the stored `env` mapping.
    pub fn read_existing_field(
        &self,
        provider_id: &str,
        field_name: &str,
    ) -> Result<Option<String>, SettingsError> {
        let def = lookup(provider_id)?;
        Ok(self.read_document(def).and_then(|doc| doc.field(field_name)))
    }

    /// Stored config for a provider, `None` if absent or without a token.
    pub fn load(&self, provider_id: &str) -> Result<Option<ProviderConfig>, SettingsError> {
        let def = lookup(provider_id)?;
        Ok(self.read_document(def).and_then(|doc| doc.to_config(def)))
    }

    /// Serialize `config` into the provider's settings file.
    ///
    /// Never writes an empty credential.
    pub fn write(&self, provider_id: &str, config: &ProviderConfig) -> Result<PathBuf, SettingsError> {
        let def = lookup(provider_id)?;
        if config.provider_id != def.id {
            return Err(SettingsError::unknown_provider(&config.provider_id));
        }
        if config.auth_token.expose().trim().is_empty() {
            return Err(SettingsError::NoTokenProvided {
                provider: def.id.to_string(),
            });
        }

        let path = self.path_for(def);
        let rendered = config.render(self.api_timeout_ms)?;

        let _lock = SettingsLock::acquire(&self.root)?;
        write_private(&path, rendered.as_bytes())?;

        tracing::info!(
            "Saved {} settings (token {}) to {}",
            def.id,
            config.auth_token.preview(),
            path.display()
        );
        Ok(path)
    }

    /// Create or refresh a provider's settings file.
    ///
    /// All-or-nothing: if neither the request nor the existing file has a
    /// token, nothing is written.
    pub fn configure(&self, request: &ConfigureRequest) -> Result<ConfigureOutcome, SettingsError> {
        let def = lookup(&request.provider_id)?;
        let existing = self.read_document(def);
        let overrides = self.overrides.get(def.id);

        let existing_token = existing.as_ref().and_then(|doc| doc.token()).map(|(_, t)| t);
        let new_input = request.token.as_deref().unwrap_or("");
        let token = carry_forward_on_empty_input(existing_token.as_deref(), new_input)
            .map_err(|_| SettingsError::NoTokenProvided {
                provider: def.id.to_string(),
            })?;
        let token_source = if new_input.trim().is_empty() {
            TokenSource::CarriedForward
        } else {
            TokenSource::Provided
        };

        // Explicit and configured URLs win; a stored one is kept otherwise.
        let mut migrated_base_url = false;
        let base_url = match non_empty(request.base_url.as_deref())
            .map(String::from)
            .or_else(|| overrides.and_then(|o| o.base_url.clone()))
        {
            Some(url) => url,
            None => match existing.as_ref().and_then(|doc| doc.field(BASE_URL)) {
                Some(stored) => match def.migrate_base_url(&stored) {
                    Some(current) => {
                        tracing::info!(
                            "Replacing deprecated {} endpoint {} with {}",
                            def.id,
                            stored,
                            current
                        );
                        migrated_base_url = true;
                        current.to_string()
                    }
                    None => stored,
                },
                None => def.base_url.to_string(),
            },
        };
        let model = non_empty(request.model.as_deref())
            .map(String::from)
            .or_else(|| overrides.and_then(|o| o.model.clone()))
            .unwrap_or_else(|| def.model.to_string());

        let mut config = ProviderConfig::from_def(def, SecureString::new(token));
        config.base_url = base_url;
        if !config.available_models.contains(&model) {
            config.available_models.push(model.clone());
        }
        config.model_name = model;

        let path = self.write(def.id, &config)?;
        Ok(ConfigureOutcome {
            path,
            token_source,
            migrated_base_url,
            config,
        })
    }

    /// Delete a provider's settings file. Returns whether one existed.
    pub fn remove(&self, provider_id: &str) -> Result<bool, SettingsError> {
        let def = lookup(provider_id)?;
        let path = self.path_for(def);
        let _lock = SettingsLock::acquire(&self.root)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Removed {} settings at {}", def.id, path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SettingsError::Write { path, source }),
        }
    }

    /// Configuration state of every known provider.
    pub fn status(&self) -> Vec<ProviderStatus> {
        registry::all()
            .iter()
            .map(|def| ProviderStatus {
                provider_id: def.id,
                display_name: def.display_name,
                path: self.path_for(def),
                config: self.read_document(def).and_then(|doc| doc.to_config(def)),
            })
            .collect()
    }

    fn path_for(&self, def: &ProviderDef) -> PathBuf {
        self.root.join(PROVIDERS_DIR).join(format!("{}.json", def.id))
    }

    /// Parsed settings file; absent, unreadable and malformed files are
    /// all `None`.
    fn read_document(&self, def: &ProviderDef) -> Option<SettingsDocument> {
        let path = self.path_for(def);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                return None;
            }
        };

        match SettingsDocument::parse(&content) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Resolve the token to store on reconfigure.
///
/// Non-empty input wins; otherwise the existing token is kept. With
/// neither, returns `NoTokenProvided` so the caller writes nothing.
pub fn carry_forward_on_empty_input(
    existing: Option<&str>,
    new_input: &str,
) -> Result<String, SettingsError> {
    if let Some(input) = non_empty(Some(new_input)) {
        return Ok(input.to_string());
    }
    match non_empty(existing) {
        Some(existing) => Ok(existing.to_string()),
        None => Err(SettingsError::NoTokenProvided {
            provider: String::new(),
        }),
    }
}

fn lookup(provider_id: &str) -> Result<&'static ProviderDef, SettingsError> {
    registry::find(provider_id).ok_or_else(|| SettingsError::unknown_provider(provider_id))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_wins_over_existing() {
        assert_eq!(
            carry_forward_on_empty_input(Some("old"), "new").unwrap(),
            "new"
        );
    }

    #[test]
    fn empty_input_keeps_existing() {
        assert_eq!(carry_forward_on_empty_input(Some("old"), "").unwrap(), "old");
        assert_eq!(carry_forward_on_empty_input(Some("old"), "   ").unwrap(), "old");
    }

    #[test]
    fn input_is_trimmed() {
        assert_eq!(carry_forward_on_empty_input(None, " sk-1 \n").unwrap(), "sk-1");
    }

    #[test]
    fn nothing_to_use_is_an_error() {
        assert!(matches!(
            carry_forward_on_empty_input(None, ""),
            Err(SettingsError::NoTokenProvided { .. })
        ));
        assert!(matches!(
            carry_forward_on_empty_input(Some(""), ""),
            Err(SettingsError::NoTokenProvided { .. })
        ));
    }

    #[test]
    fn paths_are_distinct_per_provider() {
        let store = ProviderSettingsStore::new("/tmp/root");
        let mut paths: Vec<PathBuf> = registry::known_ids()
            .into_iter()
            .map(|id| store.resolve_path(id).unwrap())
            .collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), registry::all().len());
    }
}
