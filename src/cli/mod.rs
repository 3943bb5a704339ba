//! CLI module for the Pomodoro Timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `input`: Line commands accepted inside a running session
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod input;

pub use commands::{Cli, Commands, RunArgs, SetArgs, SettingsCommand};
pub use display::{format_mm_ss, Display, StatusReport};
pub use input::{parse_command, InputError, SessionCommand, SettingField};
