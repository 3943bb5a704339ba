//! Line commands accepted by an interactive session.

use thiserror::Error;

use crate::types::{Mode, Settings};

/// A command typed into a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Pause,
    /// Start when idle, pause when running
    Toggle,
    Reset,
    Skip,
    Switch(Mode),
    Set(SettingField, u32),
    Status,
    Help,
    Quit,
}

/// A single editable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Focus,
    ShortBreak,
    LongBreak,
    Sessions,
}

impl SettingField {
    /// Returns `settings` with this field set to `value`.
    pub fn apply(self, settings: Settings, value: u32) -> Settings {
        match self {
            SettingField::Focus => settings.with_focus_minutes(value),
            SettingField::ShortBreak => settings.with_short_break_minutes(value),
            SettingField::LongBreak => settings.with_long_break_minutes(value),
            SettingField::Sessions => settings.with_sessions_before_long_break(value),
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "focus" | "f" => Some(SettingField::Focus),
            "short" | "short-break" | "sb" => Some(SettingField::ShortBreak),
            "long" | "long-break" | "lb" => Some(SettingField::LongBreak),
            "sessions" | "cadence" => Some(SettingField::Sessions),
            _ => None,
        }
    }
}

/// Errors from parsing a command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    UnknownCommand(String),

    #[error("usage: set <focus|short|long|sessions> <number>")]
    SetUsage,

    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("'{0}' is not a whole number")]
    InvalidNumber(String),
}

/// Parses one input line. An empty line toggles the timer.
///
/// # Errors
///
/// Returns an `InputError` describing what was wrong with the line.
pub fn parse_command(line: &str) -> Result<SessionCommand, InputError> {
    let lowered = line.trim().to_lowercase();
    let mut words = lowered.split_whitespace();

    let Some(head) = words.next() else {
        return Ok(SessionCommand::Toggle);
    };

    let command = match head {
        "start" | "s" => SessionCommand::Start,
        "pause" | "p" => SessionCommand::Pause,
        "toggle" | "t" => SessionCommand::Toggle,
        "reset" | "r" => SessionCommand::Reset,
        "skip" | "n" | "next" => SessionCommand::Skip,
        "focus" | "f" => SessionCommand::Switch(Mode::Focus),
        "short" | "sb" => SessionCommand::Switch(Mode::ShortBreak),
        "long" | "lb" => SessionCommand::Switch(Mode::LongBreak),
        "status" | "?" => SessionCommand::Status,
        "help" | "h" => SessionCommand::Help,
        "quit" | "q" | "exit" => SessionCommand::Quit,
        "set" => return parse_set(words.next(), words.next(), words.next()),
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };

    Ok(command)
}

fn parse_set(
    field: Option<&str>,
    value: Option<&str>,
    extra: Option<&str>,
) -> Result<SessionCommand, InputError> {
    let (Some(field), Some(value), None) = (field, value, extra) else {
        return Err(InputError::SetUsage);
    };

    let field =
        SettingField::parse(field).ok_or_else(|| InputError::UnknownSetting(field.to_string()))?;
    let value = value
        .parse()
        .map_err(|_| InputError::InvalidNumber(value.to_string()))?;

    Ok(SessionCommand::Set(field, value))
}
