//! Persisted timer settings.

use tracing::warn;

use super::{KeyValueStore, StoreError, KEY_SETTINGS};
use crate::types::Settings;

/// Loads the saved settings, falling back to defaults when they are absent,
/// unreadable or contain a zero value.
pub fn load_settings(store: &dyn KeyValueStore) -> Settings {
    let raw = match store.get(KEY_SETTINGS) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Settings::default(),
        Err(e) => {
            warn!("Failed to read settings, using defaults: {}", e);
            return Settings::default();
        }
    };

    let settings: Settings = match serde_json::from_str(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Ignoring unreadable settings: {}", e);
            return Settings::default();
        }
    };

    if let Err(e) = settings.validate() {
        warn!("Ignoring invalid saved settings: {}", e);
        return Settings::default();
    }

    settings
}

/// Validates and saves `settings`.
///
/// # Errors
///
/// Returns `StoreError::InvalidSettings` if any value is zero, or a storage
/// error if the write fails.
pub fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> Result<(), StoreError> {
    settings.validate()?;

    let json = serde_json::to_string(settings).map_err(|e| StoreError::Encode {
        key: KEY_SETTINGS.to_string(),
        message: e.to_string(),
    })?;

    store.set(KEY_SETTINGS, &json)
}
