//! Timer engine for the Pomodoro Timer.
//!
//! This module provides the core timer functionality:
//! - Mode transitions (Focus → Short/Long Break → Focus)
//! - Countdown driven by external one-second ticks
//! - Background suspend and foreground reconciliation
//! - Session counting with day rollover
//! - Event firing for the display layer

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::alert::AlertDispatcher;
use crate::storage::PersistentCounters;
use crate::types::{Mode, Settings, SuspendSnapshot, TimerState, TimerView};

use super::clock::{day_marker, Clock};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started { mode: Mode, seconds_remaining: u32 },
    /// Countdown paused
    Paused { seconds_remaining: u32 },
    /// Countdown refilled for the current mode
    Reset { mode: Mode, seconds_remaining: u32 },
    /// Mode selected by the user
    ModeSwitched { mode: Mode },
    /// One second elapsed
    Tick { seconds_remaining: u32 },
    /// A mode finished, by countdown or by skip
    Completed {
        from: Mode,
        to: Mode,
        completed_sessions: u32,
        skipped: bool,
    },
    /// Countdown advanced after returning from the background
    Reconciled {
        elapsed_seconds: u64,
        seconds_remaining: u32,
    },
    /// A new calendar day reset the session count
    DayRolledOver { day: String },
    /// New settings arrived; `applied` is false while running
    SettingsChanged { applied: bool },
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the countdown state machine.
///
/// The engine is driven from a single event loop: ticks, user commands and
/// lifecycle notifications must not run concurrently. No operation fails;
/// storage and alert problems are logged by the collaborators.
pub struct TimerEngine {
    state: TimerState,
    settings: Settings,
    counters: PersistentCounters,
    alert: Arc<dyn AlertDispatcher>,
    clock: Arc<dyn Clock>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates an idle engine in Focus mode.
    ///
    /// Loads the completed session count and runs the day rollover check.
    pub fn new(
        settings: Settings,
        counters: PersistentCounters,
        alert: Arc<dyn AlertDispatcher>,
        clock: Arc<dyn Clock>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        let completed_sessions = counters.load_session_count();
        let mut engine = Self {
            state: TimerState::new(&settings, completed_sessions),
            settings,
            counters,
            alert,
            clock,
            event_tx,
        };

        debug!(
            "Timer engine created with {} completed sessions",
            completed_sessions
        );
        engine.check_day_rollover();
        engine
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Starts the countdown. Does nothing if already running.
    pub fn start(&mut self) {
        if self.state.is_running {
            return;
        }

        self.state.is_running = true;
        debug!(
            "Started {} with {}s remaining",
            self.state.mode.as_str(),
            self.state.seconds_remaining
        );
        self.emit(TimerEvent::Started {
            mode: self.state.mode,
            seconds_remaining: self.state.seconds_remaining,
        });
    }

    /// Pauses the countdown, keeping the remaining time.
    pub fn pause(&mut self) {
        if !self.state.is_running {
            return;
        }

        self.state.is_running = false;
        self.clear_suspend();
        debug!("Paused with {}s remaining", self.state.seconds_remaining);
        self.emit(TimerEvent::Paused {
            seconds_remaining: self.state.seconds_remaining,
        });
    }

    /// Starts when idle, pauses when running.
    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stops and refills the countdown for the current mode.
    pub fn reset(&mut self) {
        self.state.reset(&self.settings);
        self.clear_suspend();
        debug!("Reset {}", self.state.mode.as_str());
        self.emit(TimerEvent::Reset {
            mode: self.state.mode,
            seconds_remaining: self.state.seconds_remaining,
        });
    }

    /// Completes the current mode immediately, without an alert.
    ///
    /// The next mode is left idle.
    pub fn skip(&mut self) {
        self.clear_suspend();
        self.complete(false);
    }

    /// Stops and loads `mode` with its full duration.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.state.switch_mode(mode, &self.settings);
        self.clear_suspend();
        debug!("Switched to {}", mode.as_str());
        self.emit(TimerEvent::ModeSwitched { mode });
    }

    /// Advances the countdown by one second.
    ///
    /// Reaching zero runs the completion transition with an alert and keeps
    /// the timer running in the next mode.
    pub fn tick(&mut self) {
        if !self.state.is_running || self.state.seconds_remaining == 0 {
            return;
        }

        let finished = self.state.tick();
        trace!("Tick: {}s remaining", self.state.seconds_remaining);
        self.emit(TimerEvent::Tick {
            seconds_remaining: self.state.seconds_remaining,
        });

        if finished {
            self.complete(true);
        }
    }

    /// Replaces the settings.
    ///
    /// The countdown is refilled with the new duration only while idle; a
    /// running countdown keeps its length until the next transition.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;

        let applied = !self.state.is_running;
        if applied {
            self.state.seconds_remaining = self.settings.seconds_for(self.state.mode);
        }

        debug!("Settings updated (applied now: {})", applied);
        self.emit(TimerEvent::SettingsChanged { applied });
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Records the suspension instant and persists a snapshot while running.
    pub fn handle_background(&mut self) {
        if !self.state.is_running {
            debug!("Backgrounded while idle, nothing to save");
            return;
        }

        let now = self.clock.now();
        self.state.suspended_at = Some(now);
        self.counters.save_suspend_state(Some(&SuspendSnapshot {
            seconds_remaining: self.state.seconds_remaining,
            is_running: true,
            suspended_at: now,
            mode: self.state.mode,
        }));

        info!(
            "Suspended {} with {}s remaining",
            self.state.mode.as_str(),
            self.state.seconds_remaining
        );
    }

    /// Reconciles a persisted snapshot with the time spent in the background.
    ///
    /// A countdown that ran out while away completes exactly once, with the
    /// alert. The snapshot is discarded either way, then the day rollover
    /// check runs if the engine ended up idle.
    pub fn handle_foreground(&mut self) {
        self.state.suspended_at = None;

        if let Some(snapshot) = self.counters.load_suspend_state() {
            if snapshot.is_running {
                self.reconcile(&snapshot);
            }
            self.counters.save_suspend_state(None);
        }

        self.check_day_rollover();
    }

    fn reconcile(&mut self, snapshot: &SuspendSnapshot) {
        let elapsed = (self.clock.now() - snapshot.suspended_at)
            .num_seconds()
            .max(0) as u64;
        let remaining = snapshot
            .seconds_remaining
            .saturating_sub(u32::try_from(elapsed).unwrap_or(u32::MAX));

        self.state.mode = snapshot.mode;
        self.state.is_running = true;
        self.state.seconds_remaining = remaining;

        info!(
            "Reconciled {}s in background, {}s remaining",
            elapsed, remaining
        );
        self.emit(TimerEvent::Reconciled {
            elapsed_seconds: elapsed,
            seconds_remaining: remaining,
        });

        if remaining == 0 {
            self.complete(true);
        }
    }

    /// Resets the session count when the calendar day changed.
    ///
    /// Skipped while running so a session is never reset mid-flight. Returns
    /// true if a rollover happened.
    pub fn check_day_rollover(&mut self) -> bool {
        if self.state.is_running {
            return false;
        }

        let today = day_marker(self.clock.today());
        match self.counters.load_last_active_day() {
            Some(day) if day == today => false,
            None => {
                self.counters.save_last_active_day(&today);
                false
            }
            Some(day) => {
                info!("New day ({} -> {}), resetting session count", day, today);
                self.state.completed_sessions = 0;
                self.counters.save_session_count(0);
                self.counters.save_last_active_day(&today);
                self.emit(TimerEvent::DayRolledOver { day: today });
                true
            }
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns the read model for rendering.
    pub fn view(&self) -> TimerView {
        self.state.view()
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the settings in effect.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns true while the countdown is running.
    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Completion transition shared by ticks reaching zero and skips.
    fn complete(&mut self, natural: bool) {
        let from = self.state.mode;
        let to = self.state.advance(&self.settings);

        if from == Mode::Focus {
            self.counters
                .save_session_count(self.state.completed_sessions);
            self.counters
                .save_last_active_day(&day_marker(self.clock.today()));
        }

        if natural {
            self.alert.notify_completion();
            self.state.is_running = true;
        } else {
            self.state.is_running = false;
        }

        info!(
            "{} finished -> {} ({} sessions{})",
            from.as_str(),
            to.as_str(),
            self.state.completed_sessions,
            if natural { "" } else { ", skipped" }
        );
        self.emit(TimerEvent::Completed {
            from,
            to,
            completed_sessions: self.state.completed_sessions,
            skipped: !natural,
        });
    }

    fn clear_suspend(&mut self) {
        self.state.suspended_at = None;
        self.counters.save_suspend_state(None);
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("Event receiver dropped, event discarded");
        }
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
