//! Key-value persistence port for the few scalars that survive a restart.
//!
//! Session identity, UI language and per-collection populated markers all go through
//! [`SettingsStore`]. The SQLite implementation lives in [`crate::db`].

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::AppError;
use crate::models::CollectionName;

pub const SESSION_ID_KEY: &str = "fw_session_id";
pub const SESSION_ROLE_KEY: &str = "fw_session_role";
pub const LANGUAGE_KEY: &str = "fw_lang";
const POPULATED_PREFIX: &str = "fw_populated:";

/// Key of the marker recording that a collection exists in the remote store.
pub fn populated_key(collection: CollectionName) -> String {
    format!("{}{}", POPULATED_PREFIX, collection.as_str())
}

/// Persistent get/set/remove of string scalars.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Process-local settings, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_settings_round_trip() {
        let settings = MemorySettings::new();
        assert_eq!(settings.get(LANGUAGE_KEY).await.unwrap(), None);

        settings.set(LANGUAGE_KEY, "ar").await.unwrap();
        assert_eq!(settings.get(LANGUAGE_KEY).await.unwrap().as_deref(), Some("ar"));

        settings.remove(LANGUAGE_KEY).await.unwrap();
        settings.remove(LANGUAGE_KEY).await.unwrap();
        assert_eq!(settings.get(LANGUAGE_KEY).await.unwrap(), None);
    }

    #[test]
    fn test_populated_key_uses_remote_name() {
        assert_eq!(
            populated_key(CollectionName::AdvanceRequests),
            "fw_populated:advanceRequests"
        );
    }
}
