//! Settings store interface.
//!
//! Settings persistence is an external collaborator. [`SettingsStore`] is a
//! minimal key-value seam; [`InMemorySettingsStore`] keeps values for the
//! lifetime of the process only.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::policy::RedactionSettings;

/// Key under which the redaction settings are stored.
pub const REDACTION_SETTINGS_KEY: &str = "redaction_settings";

/// Key-value store for user settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CoreError>;
    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), CoreError>;
    async fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemorySettingsStore {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), CoreError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// Load redaction settings, falling back to defaults when none are stored.
pub async fn load_settings(store: &dyn SettingsStore) -> Result<RedactionSettings, CoreError> {
    match store.get(REDACTION_SETTINGS_KEY).await? {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| CoreError::Settings(format!("stored settings are invalid: {e}"))),
        None => Ok(RedactionSettings::default()),
    }
}

pub async fn save_settings(
    store: &dyn SettingsStore,
    settings: &RedactionSettings,
) -> Result<(), CoreError> {
    let value = serde_json::to_value(settings)
        .map_err(|e| CoreError::Settings(format!("cannot serialize settings: {e}")))?;
    store.put(REDACTION_SETTINGS_KEY, value).await
}

/// Drop stored settings so the next load yields defaults.
pub async fn reset_settings(store: &dyn SettingsStore) -> Result<RedactionSettings, CoreError> {
    store.remove(REDACTION_SETTINGS_KEY).await?;
    Ok(RedactionSettings::default())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::policy::{PiiType, RedactionMethod};

    #[tokio::test]
    async fn load_without_saved_settings_returns_defaults() {
        let store = InMemorySettingsStore::default();
        let settings = load_settings(&store).await.unwrap();
        assert_eq!(settings, RedactionSettings::default());
    }

    #[tokio::test]
    async fn save_then_load_returns_saved_values() {
        let store = InMemorySettingsStore::default();
        let mut settings = RedactionSettings::default();
        settings.policies.set(PiiType::Org, RedactionMethod::Remove);
        settings.thresholds.face_threshold = 0.8;

        save_settings(&store, &settings).await.unwrap();
        let loaded = load_settings(&store).await.unwrap();

        assert_eq!(loaded.policies.method_for(PiiType::Org), RedactionMethod::Remove);
        assert_eq!(loaded.thresholds.face_threshold, 0.8);
    }

    #[tokio::test]
    async fn reset_discards_saved_values() {
        let store = InMemorySettingsStore::default();
        let mut settings = RedactionSettings::default();
        settings.thresholds.padding_px = 20;
        save_settings(&store, &settings).await.unwrap();

        let reset = reset_settings(&store).await.unwrap();
        assert_eq!(reset, RedactionSettings::default());
        assert_eq!(load_settings(&store).await.unwrap(), RedactionSettings::default());
    }

    #[tokio::test]
    async fn corrupt_value_is_a_settings_error() {
        let store = InMemorySettingsStore::default();
        store
            .put(REDACTION_SETTINGS_KEY, serde_json::json!({"thresholds": "high"}))
            .await
            .unwrap();
        assert_matches!(load_settings(&store).await, Err(CoreError::Settings(_)));
    }
}
