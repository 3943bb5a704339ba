//! Command definitions for the Pomodoro Timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::Settings;

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro interval timer for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "pomotimer",
    version,
    about = "Pomodoro interval timer for the terminal",
    long_about = "A Pomodoro interval timer.\n\
                  Focus sessions alternate with short breaks, and every few sessions \
                  with a long break. A running timer keeps counting while the program \
                  is closed and catches up on the next run.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding timer data (default: ~/.pomotimer)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the interactive timer
    Run(RunArgs),

    /// Show saved sessions, pending timer and settings
    Status,

    /// Show or change timer settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Start the countdown immediately
    #[arg(short, long)]
    pub start: bool,

    /// Disable the completion chime
    #[arg(long)]
    pub no_sound: bool,

    /// Disable the terminal bell on completion
    #[arg(long)]
    pub no_bell: bool,
}

// ============================================================================
// Settings Subcommands
// ============================================================================

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,

    /// Change one or more settings
    Set(SetArgs),

    /// Restore the default settings (25/5/15, long break every 4)
    Reset,
}

/// Arguments for `settings set`. Omitted values keep their current setting.
#[derive(Args, Debug, Clone, Default)]
pub struct SetArgs {
    /// Focus duration in minutes
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub focus: Option<u32>,

    /// Short break duration in minutes
    #[arg(short = 'b', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub short_break: Option<u32>,

    /// Long break duration in minutes
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub long_break: Option<u32>,

    /// Focus sessions before a long break
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub sessions: Option<u32>,
}

impl SetArgs {
    /// Returns true if no value was given.
    pub fn is_empty(&self) -> bool {
        self.focus.is_none()
            && self.short_break.is_none()
            && self.long_break.is_none()
            && self.sessions.is_none()
    }

    /// Applies the given values on top of `settings`.
    pub fn apply_to(&self, settings: Settings) -> Settings {
        let mut settings = settings;
        if let Some(minutes) = self.focus {
            settings = settings.with_focus_minutes(minutes);
        }
        if let Some(minutes) = self.short_break {
            settings = settings.with_short_break_minutes(minutes);
        }
        if let Some(minutes) = self.long_break {
            settings = settings.with_long_break_minutes(minutes);
        }
        if let Some(sessions) = self.sessions {
            settings = settings.with_sessions_before_long_break(sessions);
        }
        settings
    }
}

// ============================================================================
// Tests
// ============================================================================
