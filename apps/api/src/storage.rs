use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::countdown::{default_settings, CountdownSettings};

/// File name of the persisted settings document. The `v1` suffix versions the format.
pub const SETTINGS_FILE: &str = "nc-settings-v1.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSON-file store for the countdown settings.
///
/// Reads never fail: a missing or corrupt document reads as `None`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Option<CountdownSettings> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored settings");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read settings: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring corrupt settings: {e}");
                None
            }
        }
    }

    /// Stored settings, or the defaults relative to `today`.
    pub async fn load_or_default(&self, today: NaiveDate) -> CountdownSettings {
        match self.load().await {
            Some(settings) => settings,
            None => default_settings(today),
        }
    }

    pub async fn save(&self, settings: &CountdownSettings) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string(settings)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CountdownSettings {
        CountdownSettings {
            event_name: "Launch".to_string(),
            end_iso: "2026-09-01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested"));
        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_stored_format_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        store.save(&sample()).await.unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"eventName":"Launch","endIso":"2026-09-01"}"#);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(store.load_or_default(today).await, default_settings(today));
    }
}
