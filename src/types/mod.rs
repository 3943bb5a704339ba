//! Core data types for the Pomodoro Timer.
//!
//! This module defines the data structures used for:
//! - Timer modes and their durations
//! - Timer settings with validation
//! - The persisted suspend snapshot
//! - The read model exposed to the display layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Mode
// ============================================================================

/// Represents the active phase of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Focused work
    #[default]
    Focus,
    /// Short break between focus sessions
    ShortBreak,
    /// Long break after every N focus sessions
    LongBreak,
}

impl Mode {
    /// All modes, in display order.
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::ShortBreak => "short_break",
            Mode::LongBreak => "long_break",
        }
    }

    /// Returns a human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Returns true for either break mode.
    pub fn is_break(&self) -> bool {
        matches!(self, Mode::ShortBreak | Mode::LongBreak)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Errors raised at the settings-edit boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A duration or count was zero.
    #[error("{0} must be 1 or more")]
    ZeroValue(&'static str),
}

impl SettingsError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::ZeroValue(_) => "Values cannot be 0. Please set them to 1 or more.",
        }
    }
}

/// Timer settings: three durations in minutes and the long-break cadence.
///
/// The engine treats a value as an immutable snapshot. Validation happens
/// where settings are edited, never inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Focus duration in minutes
    #[serde(rename = "focusDuration")]
    pub focus_minutes: u32,
    /// Short break duration in minutes
    #[serde(rename = "shortBreakDuration")]
    pub short_break_minutes: u32,
    /// Long break duration in minutes
    #[serde(rename = "longBreakDuration")]
    pub long_break_minutes: u32,
    /// Number of focus sessions before a long break
    #[serde(rename = "sessionsBeforeLongBreak")]
    pub sessions_before_long_break: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            sessions_before_long_break: 4,
        }
    }
}

impl Settings {
    /// Returns a copy with the specified focus duration.
    pub fn with_focus_minutes(mut self, minutes: u32) -> Self {
        self.focus_minutes = minutes;
        self
    }

    /// Returns a copy with the specified short break duration.
    pub fn with_short_break_minutes(mut self, minutes: u32) -> Self {
        self.short_break_minutes = minutes;
        self
    }

    /// Returns a copy with the specified long break duration.
    pub fn with_long_break_minutes(mut self, minutes: u32) -> Self {
        self.long_break_minutes = minutes;
        self
    }

    /// Returns a copy with the specified long-break cadence.
    pub fn with_sessions_before_long_break(mut self, sessions: u32) -> Self {
        self.sessions_before_long_break = sessions;
        self
    }

    /// Duration of `mode` in minutes.
    pub fn minutes_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus_minutes,
            Mode::ShortBreak => self.short_break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        }
    }

    /// Full countdown length of `mode` in seconds.
    pub fn seconds_for(&self, mode: Mode) -> u32 {
        self.minutes_for(mode).saturating_mul(60)
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ZeroValue` naming the first field that is 0.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.focus_minutes == 0 {
            return Err(SettingsError::ZeroValue("focus duration"));
        }
        if self.short_break_minutes == 0 {
            return Err(SettingsError::ZeroValue("short break duration"));
        }
        if self.long_break_minutes == 0 {
            return Err(SettingsError::ZeroValue("long break duration"));
        }
        if self.sessions_before_long_break == 0 {
            return Err(SettingsError::ZeroValue("sessions before long break"));
        }
        Ok(())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Countdown state owned by the timer engine.
///
/// The methods here are pure transitions; persistence, alerts and events are
/// handled by `TimerEngine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    /// Active mode
    pub mode: Mode,
    /// Seconds left in the active mode
    pub seconds_remaining: u32,
    /// Whether the countdown is running
    pub is_running: bool,
    /// Focus sessions completed today
    pub completed_sessions: u32,
    /// When the host was backgrounded while running
    pub suspended_at: Option<DateTime<Utc>>,
}

impl TimerState {
    /// Creates an idle Focus state with a full countdown.
    pub fn new(settings: &Settings, completed_sessions: u32) -> Self {
        Self {
            mode: Mode::Focus,
            seconds_remaining: settings.seconds_for(Mode::Focus),
            is_running: false,
            completed_sessions,
            suspended_at: None,
        }
    }

    /// Stops the countdown and refills it for the current mode.
    pub fn reset(&mut self, settings: &Settings) {
        self.is_running = false;
        self.seconds_remaining = settings.seconds_for(self.mode);
    }

    /// Stops the countdown and loads `mode` with its full duration.
    pub fn switch_mode(&mut self, mode: Mode, settings: &Settings) {
        self.mode = mode;
        self.reset(settings);
    }

    /// Decrements the countdown by one second while running.
    ///
    /// Returns true if this tick brought the countdown to zero.
    pub fn tick(&mut self) -> bool {
        if !self.is_running || self.seconds_remaining == 0 {
            return false;
        }
        self.seconds_remaining -= 1;
        self.seconds_remaining == 0
    }

    /// Returns the mode that follows the current one.
    ///
    /// For Focus this looks at the count *after* the session in progress is
    /// credited, so it must be called before `advance`.
    pub fn next_mode(&self, settings: &Settings) -> Mode {
        match self.mode {
            Mode::Focus => {
                let cadence = settings.sessions_before_long_break.max(1);
                if self.completed_sessions.saturating_add(1) % cadence == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Focus,
        }
    }

    /// Applies the completion transition and returns the new mode.
    ///
    /// Leaving Focus credits one session. The running flag is left to the
    /// caller, since natural and skipped completions differ there.
    pub fn advance(&mut self, settings: &Settings) -> Mode {
        let next = self.next_mode(settings);
        if self.mode == Mode::Focus {
            self.completed_sessions = self.completed_sessions.saturating_add(1);
        }
        self.mode = next;
        self.seconds_remaining = settings.seconds_for(next);
        next
    }

    /// Returns the read model for rendering.
    pub fn view(&self) -> TimerView {
        TimerView {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            is_running: self.is_running,
            completed_sessions: self.completed_sessions,
        }
    }
}

// ============================================================================
// SuspendSnapshot
// ============================================================================

/// Countdown state captured when the host goes to the background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendSnapshot {
    /// Remaining seconds at the moment of suspension
    pub seconds_remaining: u32,
    /// Whether the countdown was running
    pub is_running: bool,
    /// Wall-clock instant of suspension (epoch milliseconds on disk)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub suspended_at: DateTime<Utc>,
    /// Mode at the moment of suspension
    pub mode: Mode,
}

// ============================================================================
// TimerView
// ============================================================================

/// Read model exposed for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub mode: Mode,
    pub seconds_remaining: u32,
    pub is_running: bool,
    pub completed_sessions: u32,
}

// ============================================================================
// Tests
// ============================================================================
