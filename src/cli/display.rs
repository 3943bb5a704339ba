//! Display utilities for the Pomodoro Timer CLI.
//!
//! This module provides formatted output for:
//! - The live countdown line
//! - Engine events
//! - Status and settings reports
//! - Error messages
//!
//! Rendering is split into pure `render_*` functions returning strings and
//! `show_*` wrappers that print them.

use std::io::Write;

use crate::engine::TimerEvent;
use crate::types::{Mode, Settings, SuspendSnapshot, TimerView};

/// Returns the cursor to column 0 and clears the line, so messages replace
/// the live countdown instead of being appended to it.
const CLEAR_LINE: &str = "\r\x1b[2K";

// ============================================================================
// Formatting
// ============================================================================

/// Formats seconds as zero-padded `MM:SS`. There is no hours component.
pub fn format_mm_ss(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Persisted state shown by the `status` subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Today's marker (`YYYY-MM-DD`), compared against `last_active_day`.
    pub today: String,
    /// The stored count, which belongs to `last_active_day`.
    pub completed_sessions: u32,
    pub last_active_day: Option<String>,
    pub snapshot: Option<SuspendSnapshot>,
    pub settings: Settings,
}

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Renders the one-line countdown.
    pub fn render_countdown(view: &TimerView) -> String {
        let marker = if view.is_running { ">" } else { "||" };
        format!(
            "{} {:<11} {}  #{}",
            marker,
            view.mode.label(),
            format_mm_ss(view.seconds_remaining),
            view.completed_sessions
        )
    }

    /// Renders an engine event, or `None` for events that only refresh the
    /// countdown line.
    pub fn render_event(event: &TimerEvent) -> Option<String> {
        let line = match event {
            TimerEvent::Tick { .. } => return None,
            TimerEvent::Started {
                mode,
                seconds_remaining,
            } => format!(
                "> {} started ({})",
                mode.label(),
                format_mm_ss(*seconds_remaining)
            ),
            TimerEvent::Paused { seconds_remaining } => {
                format!("|| Paused at {}", format_mm_ss(*seconds_remaining))
            }
            TimerEvent::Reset {
                mode,
                seconds_remaining,
            } => format!(
                "<< {} reset to {}",
                mode.label(),
                format_mm_ss(*seconds_remaining)
            ),
            TimerEvent::ModeSwitched { mode } => format!("-> Switched to {}", mode.label()),
            TimerEvent::Completed {
                from,
                to,
                completed_sessions,
                skipped,
            } => {
                let verb = if *skipped { "skipped" } else { "finished" };
                if *from == Mode::Focus {
                    format!(
                        "* {} {} (session #{}), next: {}",
                        from.label(),
                        verb,
                        completed_sessions,
                        to.label()
                    )
                } else {
                    format!("* {} {}, next: {}", from.label(), verb, to.label())
                }
            }
            TimerEvent::Reconciled {
                elapsed_seconds,
                seconds_remaining,
            } => format!(
                "~ Caught up {}s spent away, {} left",
                elapsed_seconds,
                format_mm_ss(*seconds_remaining)
            ),
            TimerEvent::DayRolledOver { day } => {
                format!("* New day ({}), session count reset", day)
            }
            TimerEvent::SettingsChanged { applied } => {
                if *applied {
                    "* Settings applied".to_string()
                } else {
                    "* Settings saved, applied after the current countdown".to_string()
                }
            }
        };
        Some(line)
    }

    /// Renders the `status` subcommand report.
    pub fn render_status_report(report: &StatusReport) -> String {
        let mut lines = vec![
            "Pomodoro Timer Status".to_string(),
            "─────────────────────────────".to_string(),
            Self::render_sessions_today(report),
            format!(
                "Last active day: {}",
                report.last_active_day.as_deref().unwrap_or("never")
            ),
        ];

        match &report.snapshot {
            Some(snapshot) => lines.push(format!(
                "Suspended: {} with {} left at {}",
                snapshot.mode.label(),
                format_mm_ss(snapshot.seconds_remaining),
                snapshot.suspended_at.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            None => lines.push("Suspended: no".to_string()),
        }

        lines.push(Self::render_settings(&report.settings));
        lines.join("\n")
    }

    /// The stored count only counts for today while the day marker matches;
    /// otherwise the next run resets it.
    fn render_sessions_today(report: &StatusReport) -> String {
        match report.last_active_day.as_deref() {
            Some(day) if day != report.today => format!(
                "Sessions today: 0 ({} on {})",
                report.completed_sessions, day
            ),
            _ => format!("Sessions today: {}", report.completed_sessions),
        }
    }

    /// Renders the settings block.
    pub fn render_settings(settings: &Settings) -> String {
        format!(
            "Focus: {} min\nShort break: {} min\nLong break: {} min\nSessions before long break: {}",
            settings.focus_minutes,
            settings.short_break_minutes,
            settings.long_break_minutes,
            settings.sessions_before_long_break
        )
    }

    /// Redraws the countdown line in place.
    pub fn show_countdown(view: &TimerView) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "{}{}", CLEAR_LINE, Self::render_countdown(view));
        let _ = stdout.flush();
    }

    /// Prints an engine event and redraws the countdown.
    pub fn show_event(event: &TimerEvent, view: &TimerView) {
        if let Some(line) = Self::render_event(event) {
            println!("{}{}", CLEAR_LINE, line);
        }
        Self::show_countdown(view);
    }

    /// Prints the current view on its own line.
    pub fn show_view(view: &TimerView) {
        Self::show_countdown(view);
    }

    /// Prints the in-session status.
    pub fn show_status(view: &TimerView, settings: &Settings) {
        println!("{}{}", CLEAR_LINE, Self::render_countdown(view));
        println!("{}", Self::render_settings(settings));
        Self::show_countdown(view);
    }

    /// Prints the `status` subcommand report.
    pub fn show_status_report(report: &StatusReport) {
        println!("{}", Self::render_status_report(report));
    }

    /// Prints the settings.
    pub fn show_settings(settings: &Settings) {
        println!("{}{}", CLEAR_LINE, Self::render_settings(settings));
    }

    /// Shows a success message after saving settings.
    pub fn show_settings_saved(settings: &Settings) {
        println!("* Settings saved");
        println!("{}", Self::render_settings(settings));
    }

    /// Prints the interactive command list.
    pub fn show_help() {
        println!(
            "{}Commands:\n  \
             start | pause | toggle (or Enter) | reset | skip\n  \
             focus | short | long          switch mode\n  \
             set <focus|short|long|sessions> <n>\n  \
             status | help | quit",
            CLEAR_LINE
        );
    }

    /// Prints the final line when the session ends.
    pub fn show_goodbye(view: &TimerView) {
        if view.is_running {
            println!(
                "{}Timer saved with {} left; it keeps counting until the next run",
                CLEAR_LINE,
                format_mm_ss(view.seconds_remaining)
            );
        } else {
            println!("{}Bye", CLEAR_LINE);
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("{}Error: {}", CLEAR_LINE, message);
    }
}

// ============================================================================
// Tests
// ============================================================================
