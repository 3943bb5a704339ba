//! Pomodoro Timer Library
//!
//! This library provides the core functionality for the Pomodoro Timer CLI.
//! It includes:
//! - Timer engine driving focus/break cycles
//! - Durable storage for counters, settings and suspend snapshots
//! - Interactive session host with lifecycle handling
//! - CLI command parsing and display utilities
//! - Completion alerts (terminal bell, optional audible chime)

pub mod alert;
pub mod cli;
pub mod engine;
pub mod session;
pub mod sound;
pub mod storage;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{Mode, Settings, SettingsError, SuspendSnapshot, TimerState, TimerView};

pub use engine::{Clock, ManualClock, SystemClock, TickSource, TimerEngine, TimerEvent};

pub use storage::{
    load_settings, save_settings, JsonFileStore, KeyValueStore, MemoryStore, PersistentCounters,
    StoreError,
};

pub use alert::{AlertDispatcher, ChimeAlert, MockAlert};

pub use session::{LifecycleEvent, LifecycleSubscription, Session, SessionExit, SessionOptions};

// Re-export sound types
pub use sound::{try_create_player, MockSoundPlayer, SoundError, SoundPlayer};
