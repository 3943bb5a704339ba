//! Durable key-value storage for the Pomodoro Timer.
//!
//! The timer only keeps a handful of scalars across restarts: the completed
//! session count, the last active day, the background suspend snapshot and
//! the user's settings. They all go through [`KeyValueStore`], which is
//! injected into the engine rather than accessed globally.
//!
//! [`PersistentCounters`] is the typed facade the engine uses. It treats the
//! store as eventually-consistent memory: read failures become "absent" and
//! write failures are logged and dropped.

mod error;
mod file;
mod settings;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::types::SuspendSnapshot;

pub use error::StoreError;
pub use file::{default_data_dir, JsonFileStore, DATA_DIR_NAME, STORE_FILE_NAME};
pub use settings::{load_settings, save_settings};

/// Storage key for the completed session count.
pub const KEY_COMPLETED_SESSIONS: &str = "completedSessions";
/// Storage key for the last active calendar day (`YYYY-MM-DD`).
pub const KEY_LAST_ACTIVE_DAY: &str = "lastActiveDay";
/// Storage key for the background suspend snapshot.
pub const KEY_SUSPEND_STATE: &str = "timerState";
/// Storage key for the persisted settings.
pub const KEY_SETTINGS: &str = "pomodoroSettings";

/// A durable string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: std::sync::atomic::AtomicBool,
    fail_writes: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Makes every subsequent `set`/`remove` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Returns a copy of the raw value under `key`, bypassing failure flags.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn simulated_failure() -> StoreError {
        StoreError::io(
            "<memory>",
            std::io::Error::new(std::io::ErrorKind::Other, "simulated failure"),
        )
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(Self::simulated_failure());
        }
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(Self::simulated_failure());
        }
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(Self::simulated_failure());
        }
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

// ============================================================================
// PersistentCounters
// ============================================================================

/// Typed access to the timer's persisted counters and suspend snapshot.
#[derive(Clone)]
pub struct PersistentCounters {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for PersistentCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCounters").finish_non_exhaustive()
    }
}

impl PersistentCounters {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Loads the completed session count, defaulting to 0.
    pub fn load_session_count(&self) -> u32 {
        let Some(raw) = self.read(KEY_COMPLETED_SESSIONS) else {
            return 0;
        };
        match raw.trim().parse() {
            Ok(count) => count,
            Err(e) => {
                warn!("Ignoring unreadable session count '{}': {}", raw, e);
                0
            }
        }
    }

    pub fn save_session_count(&self, count: u32) {
        self.write(KEY_COMPLETED_SESSIONS, &count.to_string());
    }

    /// Loads the last active day marker.
    pub fn load_last_active_day(&self) -> Option<String> {
        self.read(KEY_LAST_ACTIVE_DAY)
            .map(|day| day.trim().to_string())
            .filter(|day| !day.is_empty())
    }

    pub fn save_last_active_day(&self, day: &str) {
        self.write(KEY_LAST_ACTIVE_DAY, day);
    }

    /// Writes the suspend snapshot, or removes it when `None`.
    pub fn save_suspend_state(&self, snapshot: Option<&SuspendSnapshot>) {
        let Some(snapshot) = snapshot else {
            if let Err(e) = self.store.remove(KEY_SUSPEND_STATE) {
                warn!("Failed to clear suspend snapshot: {}", e);
            }
            return;
        };

        match serde_json::to_string(snapshot) {
            Ok(json) => self.write(KEY_SUSPEND_STATE, &json),
            Err(e) => warn!("Failed to encode suspend snapshot: {}", e),
        }
    }

    /// Loads the suspend snapshot. Unparsable snapshots count as absent.
    pub fn load_suspend_state(&self) -> Option<SuspendSnapshot> {
        let raw = self.read(KEY_SUSPEND_STATE)?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Ignoring unreadable suspend snapshot: {}", e);
                None
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read '{}', using default: {}", key, e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        match self.store.set(key, value) {
            Ok(()) => debug!("Persisted '{}'", key),
            Err(e) => warn!("Failed to persist '{}': {}", key, e),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
