//! The shared settings document holding `defaultModel`.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::error::SettingsError;
use super::fs::{write_private, SettingsLock};
use super::registry::{self, ProviderDef};
use super::store::ProviderSettingsStore;

const SHARED_FILENAME: &str = "settings.json";
const DEFAULT_MODEL_KEY: &str = "defaultModel";

/// Value reported when no default model is stored.
pub const PLAIN_DEFAULT: &str = "default";

/// What the default model selects when no provider is given.
#[derive(Debug, Clone, Copy)]
pub enum DefaultTarget {
    /// Launch Claude Code with its own configuration.
    Plain,
    /// Launch with a provider, optionally pinning one of its models.
    Provider {
        def: &'static ProviderDef,
        model: Option<&'static str>,
    },
}

impl ProviderSettingsStore {
    pub fn shared_settings_path(&self) -> PathBuf {
        self.root().join(SHARED_FILENAME)
    }

    /// Stored default model, or `"default"`.
    pub fn get_default_model(&self) -> String {
        self.read_shared()
            .and_then(|root| match root.get(DEFAULT_MODEL_KEY) {
                Some(Value::String(model)) if !model.trim().is_empty() => Some(model.clone()),
                _ => None,
            })
            .unwrap_or_else(|| PLAIN_DEFAULT.to_string())
    }

    /// Set `defaultModel`, leaving every other key untouched.
    ///
    /// Only names [`resolve_default_target`](Self::resolve_default_target)
    /// can map are accepted: `"default"`, a provider id, or a known model.
    pub fn set_default_model(&self, model_name: &str) -> Result<(), SettingsError> {
        let model_name = model_name.trim();
        if model_name.is_empty() {
            return Err(SettingsError::EmptyModelName);
        }
        target_for(model_name)?;

        let path = self.shared_settings_path();
        let _lock = SettingsLock::acquire(self.root())?;

        let mut root = self.read_shared().unwrap_or_default();
        root.insert(
            DEFAULT_MODEL_KEY.to_string(),
            Value::String(model_name.to_string()),
        );
        let rendered = serde_json::to_string_pretty(&Value::Object(root))?;
        write_private(&path, rendered.as_bytes())?;

        tracing::info!("Default model set to {}", model_name);
        Ok(())
    }

    /// Map the default model to a launch target.
    pub fn resolve_default_target(&self) -> Result<DefaultTarget, SettingsError> {
        target_for(&self.get_default_model())
    }

    /// Shared document as an object. Absent, unreadable and malformed
    /// documents are `None`.
    fn read_shared(&self) -> Option<Map<String, Value>> {
        let path = self.shared_settings_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(root)) => Some(root),
            Ok(_) => {
                tracing::warn!("Ignoring settings {}: root is not an object", path.display());
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn target_for(model: &str) -> Result<DefaultTarget, SettingsError> {
    if model == PLAIN_DEFAULT {
        return Ok(DefaultTarget::Plain);
    }

    let def = registry::find_by_id_or_model(model).ok_or_else(|| SettingsError::UnknownModel {
        model: model.to_string(),
        scope: "any provider".to_string(),
    })?;
    let pinned = def.available_models.iter().copied().find(|m| *m == model);
    Ok(DefaultTarget::Provider { def, model: pinned })
}
