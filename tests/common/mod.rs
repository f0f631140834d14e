//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;

use claude_switch::provider::{ConfigureRequest, ProviderSettingsStore};
use tempfile::TempDir;

/// Store rooted in a fresh temp directory.
pub fn temp_store() -> (TempDir, ProviderSettingsStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProviderSettingsStore::new(temp_dir.path());
    (temp_dir, store)
}

/// Write raw content where the provider's settings file lives.
pub fn write_raw(store: &ProviderSettingsStore, provider: &str, content: &str) -> PathBuf {
    let path = store.resolve_path(provider).expect("known provider");
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create dir");
    std::fs::write(&path, content).expect("Failed to write settings");
    path
}

/// Configure a provider with a token and defaults.
pub fn configure_with(store: &ProviderSettingsStore, provider: &str, token: &str) {
    store
        .configure(&ConfigureRequest::new(provider).token(token))
        .expect("configure should succeed");
}

/// Parse a settings file as generic JSON.
pub fn read_json(path: &std::path::Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("Failed to read settings");
    serde_json::from_str(&content).expect("settings must be valid JSON")
}
