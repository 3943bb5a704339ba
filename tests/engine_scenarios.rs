//! Scenario tests for the timer engine through the public API.
//!
//! These cover complete cycles that cross several operations:
//! - Full focus/break cadence up to the long break
//! - Reset and tick arithmetic for arbitrary settings
//! - Alerts on natural completion only
//! - Background reconciliation across a process restart
//! - Day rollover

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;

use pomotimer::storage::{MemoryStore, KEY_COMPLETED_SESSIONS, KEY_LAST_ACTIVE_DAY};
use pomotimer::{ManualClock, MockAlert, Mode, PersistentCounters, Settings, TimerEngine, TimerEvent};

// ============================================================================
// Test Helpers
// ============================================================================

/// An engine wired to in-memory collaborators.
struct Fixture {
    engine: TimerEngine,
    events: mpsc::UnboundedReceiver<TimerEvent>,
    store: Arc<MemoryStore>,
    alert: Arc<MockAlert>,
    clock: Arc<ManualClock>,
}

impl Fixture {
    fn new(settings: Settings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        Self::with(settings, store, clock)
    }

    fn with(settings: Settings, store: Arc<MemoryStore>, clock: Arc<ManualClock>) -> Self {
        let alert = Arc::new(MockAlert::new());
        let (tx, events) = mpsc::unbounded_channel();
        let engine = TimerEngine::new(
            settings,
            PersistentCounters::new(store.clone()),
            alert.clone(),
            clock.clone(),
            tx,
        );
        Self {
            engine,
            events,
            store,
            alert,
            clock,
        }
    }

    /// Builds a second engine over the same store and clock, as a restart would.
    fn restart(&self, settings: Settings) -> Self {
        Self::with(settings, self.store.clone(), self.clock.clone())
    }

    fn tick_n(&mut self, n: u32) {
        for _ in 0..n {
            self.engine.tick();
        }
    }

    fn drain(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    fn completions(&mut self) -> usize {
        self.drain()
            .iter()
            .filter(|e| matches!(e, TimerEvent::Completed { .. }))
            .count()
    }
}

// ============================================================================
// Cadence
// ============================================================================

#[test]
fn test_four_ticked_focus_sessions_reach_long_break() {
    let settings = Settings::default();
    let mut f = Fixture::new(settings);
    f.engine.start();

    let mut focus_targets = Vec::new();
    for _ in 0..4 {
        assert_eq!(f.engine.state().mode, Mode::Focus);
        assert_eq!(f.engine.state().seconds_remaining, 1500);
        f.tick_n(1500);
        focus_targets.push(f.engine.state().mode);

        if f.engine.state().mode == Mode::ShortBreak {
            assert_eq!(f.engine.state().seconds_remaining, 300);
            f.tick_n(300);
        }
    }

    assert_eq!(
        focus_targets,
        vec![Mode::ShortBreak, Mode::ShortBreak, Mode::ShortBreak, Mode::LongBreak]
    );
    assert_eq!(f.engine.state().completed_sessions, 4);
    assert_eq!(f.engine.state().seconds_remaining, 900);
    assert!(f.engine.is_running());
    // Four focus and three short break completions
    assert_eq!(f.alert.call_count(), 7);
}

#[test]
fn test_four_skipped_focus_sessions_reach_long_break() {
    let mut f = Fixture::new(Settings::default());

    let mut focus_targets = Vec::new();
    for _ in 0..4 {
        f.engine.skip();
        focus_targets.push(f.engine.state().mode);
        if f.engine.state().mode == Mode::ShortBreak {
            f.engine.skip();
        }
    }

    assert_eq!(
        focus_targets,
        vec![Mode::ShortBreak, Mode::ShortBreak, Mode::ShortBreak, Mode::LongBreak]
    );
    assert_eq!(f.engine.state().completed_sessions, 4);
    assert!(!f.engine.is_running());
    assert_eq!(f.alert.call_count(), 0);
    assert_eq!(f.store.raw(KEY_COMPLETED_SESSIONS).as_deref(), Some("4"));
}

#[test]
fn test_long_break_returns_to_focus() {
    let mut f = Fixture::new(Settings::default().with_sessions_before_long_break(1));

    f.engine.skip();
    assert_eq!(f.engine.state().mode, Mode::LongBreak);

    f.engine.skip();
    assert_eq!(f.engine.state().mode, Mode::Focus);
    assert_eq!(f.engine.state().completed_sessions, 1);
}

// ============================================================================
// Countdown arithmetic
// ============================================================================

#[test]
fn test_reset_fills_full_duration_for_each_mode() {
    let settings = Settings::default()
        .with_focus_minutes(50)
        .with_short_break_minutes(7)
        .with_long_break_minutes(33);
    let mut f = Fixture::new(settings);

    for mode in Mode::ALL {
        f.engine.switch_mode(mode);
        f.engine.start();
        f.tick_n(3);
        f.engine.reset();

        assert_eq!(
            f.engine.state().seconds_remaining,
            settings.minutes_for(mode) * 60
        );
        assert!(!f.engine.is_running());
    }
}

#[test]
fn test_ticking_past_zero_completes_once() {
    let mut f = Fixture::new(Settings::default().with_focus_minutes(1));
    f.engine.start();
    f.drain();

    f.tick_n(60);
    assert_eq!(f.completions(), 1);

    // The next countdown starts full; it cannot underflow.
    assert_eq!(f.engine.state().mode, Mode::ShortBreak);
    assert_eq!(f.engine.state().seconds_remaining, 300);
}

#[test]
fn test_pause_freezes_the_countdown() {
    let mut f = Fixture::new(Settings::default());
    f.engine.start();
    f.tick_n(10);
    f.engine.pause();
    f.tick_n(10);

    assert_eq!(f.engine.state().seconds_remaining, 1490);
}

// ============================================================================
// Background reconciliation
// ============================================================================

/// Starts a 2-minute focus and ticks it down to 100 seconds.
fn fixture_at_100_seconds() -> Fixture {
    let mut f = Fixture::new(Settings::default().with_focus_minutes(2));
    f.engine.start();
    f.tick_n(20);
    assert_eq!(f.engine.state().seconds_remaining, 100);
    f.drain();
    f
}

#[test]
fn test_resume_after_37_seconds() {
    let mut f = fixture_at_100_seconds();

    f.engine.handle_background();
    f.clock.advance_secs(37);
    f.engine.handle_foreground();

    assert_eq!(f.engine.state().seconds_remaining, 63);
    assert!(f.engine.is_running());
    assert_eq!(f.completions(), 0);
}

#[test]
fn test_resume_after_remaining_time_ran_out() {
    let mut f = fixture_at_100_seconds();

    f.engine.handle_background();
    f.clock.advance_secs(150);
    f.engine.handle_foreground();

    let events = f.drain();
    assert!(events.contains(&TimerEvent::Reconciled {
        elapsed_seconds: 150,
        seconds_remaining: 0,
    }));
    let completions = events
        .iter()
        .filter(|e| matches!(e, TimerEvent::Completed { skipped: false, .. }))
        .count();
    assert_eq!(completions, 1);
    assert_eq!(f.alert.call_count(), 1);
    assert_eq!(f.engine.state().mode, Mode::ShortBreak);
    assert!(f.engine.is_running());

    // A second resume without a new suspend does nothing.
    f.engine.handle_foreground();
    assert_eq!(f.completions(), 0);
}

#[test]
fn test_reconcile_across_restart() {
    let mut f = fixture_at_100_seconds();
    f.engine.handle_background();
    f.clock.advance_secs(37);

    let mut restarted = f.restart(Settings::default().with_focus_minutes(2));
    restarted.engine.handle_foreground();

    assert_eq!(restarted.engine.state().mode, Mode::Focus);
    assert_eq!(restarted.engine.state().seconds_remaining, 63);
    assert!(restarted.engine.is_running());
}

#[test]
fn test_pause_before_background_keeps_remaining() {
    let mut f = fixture_at_100_seconds();
    f.engine.pause();

    f.engine.handle_background();
    f.clock.advance_secs(600);
    f.engine.handle_foreground();

    assert_eq!(f.engine.state().seconds_remaining, 100);
    assert!(!f.engine.is_running());
}

// ============================================================================
// Day rollover
// ============================================================================

#[test]
fn test_restart_on_a_new_day_resets_count_once() {
    let mut f = Fixture::new(Settings::default());
    f.engine.skip();
    f.engine.skip();
    f.engine.skip();
    assert_eq!(f.engine.state().completed_sessions, 2);
    assert_eq!(
        f.store.raw(KEY_LAST_ACTIVE_DAY).as_deref(),
        Some("2024-05-01")
    );

    f.clock.advance_secs(24 * 60 * 60);
    let mut next_day = f.restart(Settings::default());

    assert_eq!(next_day.engine.state().completed_sessions, 0);
    assert_eq!(f.store.raw(KEY_COMPLETED_SESSIONS).as_deref(), Some("0"));
    let rollovers = next_day
        .drain()
        .iter()
        .filter(|e| matches!(e, TimerEvent::DayRolledOver { .. }))
        .count();
    assert_eq!(rollovers, 1);

    next_day.engine.handle_foreground();
    assert!(next_day.drain().is_empty());
}

#[test]
fn test_day_change_never_resets_mid_session() {
    let mut f = Fixture::new(Settings::default());
    f.engine.skip();
    f.engine.skip();
    f.engine.start();

    f.clock.advance_secs(24 * 60 * 60);
    f.engine.handle_foreground();
    assert_eq!(f.engine.state().completed_sessions, 1);

    f.engine.pause();
    f.engine.handle_foreground();
    assert_eq!(f.engine.state().completed_sessions, 0);
}

#[test]
fn test_sessions_after_midnight_are_kept_on_restart() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap(),
    ));
    let mut f = Fixture::with(Settings::default(), store, clock);

    f.clock.advance_secs(2 * 60 * 60);
    f.engine.skip();
    f.engine.skip();
    f.engine.skip();
    assert_eq!(f.engine.state().completed_sessions, 2);
    assert_eq!(
        f.store.raw(KEY_LAST_ACTIVE_DAY).as_deref(),
        Some("2024-05-02")
    );

    let mut restarted = f.restart(Settings::default());

    assert_eq!(restarted.engine.state().completed_sessions, 2);
    assert_eq!(f.store.raw(KEY_COMPLETED_SESSIONS).as_deref(), Some("2"));
    assert!(restarted.drain().is_empty());
}
