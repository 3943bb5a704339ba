//! Pomodoro Timer CLI
//!
//! This tool helps you stay focused using the Pomodoro Technique:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 15 minutes of long break after 4 pomodoros

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::io::BufReader;

use pomotimer::cli::{Cli, Commands, Display, RunArgs, SettingsCommand, StatusReport};
use pomotimer::engine::{day_marker, Clock, SystemClock};
use pomotimer::storage::{
    default_data_dir, load_settings, save_settings, JsonFileStore, KeyValueStore,
    PersistentCounters,
};
use pomotimer::{
    try_create_player, ChimeAlert, LifecycleSubscription, Session, SessionOptions, Settings,
};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    // A pending stdin read would otherwise hold runtime shutdown until the
    // next line arrives.
    std::process::exit(0);
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => {
            let store = open_store(cli.data_dir)?;
            run_session(store, &args).await?;
        }
        Some(Commands::Status) => {
            let store = open_store(cli.data_dir)?;
            Display::show_status_report(&status_report(store, &SystemClock));
        }
        Some(Commands::Settings(command)) => {
            let store = open_store(cli.data_dir)?;
            execute_settings(store.as_ref(), command)?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Opens the JSON store in `data_dir`, or in `~/.pomotimer` when unset.
fn open_store(data_dir: Option<PathBuf>) -> Result<Arc<dyn KeyValueStore>> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => default_data_dir().map_err(|e| anyhow::anyhow!("{} ({})", e, e.suggestion()))?,
    };
    let store = JsonFileStore::in_dir(&data_dir);
    tracing::debug!("Using store at {}", store.path().display());
    Ok(Arc::new(store))
}

/// Runs the interactive session on stdin until quit or a shutdown signal.
async fn run_session(store: Arc<dyn KeyValueStore>, args: &RunArgs) -> Result<()> {
    let settings = load_settings(store.as_ref());
    let alert = Arc::new(ChimeAlert::new(
        try_create_player(args.no_sound),
        !args.no_bell,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut session = Session::new(
        settings,
        store,
        alert,
        clock,
        SessionOptions { start: args.start },
    );

    let exit = session
        .run(
            BufReader::new(tokio::io::stdin()),
            LifecycleSubscription::from_signals(),
        )
        .await
        .context("Timer session failed")?;

    tracing::debug!("Session ended: {:?}", exit);
    Ok(())
}

/// Collects the persisted state for the `status` subcommand.
fn status_report(store: Arc<dyn KeyValueStore>, clock: &dyn Clock) -> StatusReport {
    let settings = load_settings(store.as_ref());
    let counters = PersistentCounters::new(store);

    StatusReport {
        today: day_marker(clock.today()),
        completed_sessions: counters.load_session_count(),
        last_active_day: counters.load_last_active_day(),
        snapshot: counters.load_suspend_state(),
        settings,
    }
}

/// Executes a `settings` subcommand.
fn execute_settings(store: &dyn KeyValueStore, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            Display::show_settings(&load_settings(store));
        }
        SettingsCommand::Set(args) => {
            if args.is_empty() {
                anyhow::bail!("Nothing to change; pass at least one of --focus, --short-break, --long-break, --sessions");
            }
            let settings = args.apply_to(load_settings(store));
            save_settings(store, &settings)
                .map_err(|e| anyhow::anyhow!("{} ({})", e, e.suggestion()))?;
            Display::show_settings_saved(&settings);
        }
        SettingsCommand::Reset => {
            let settings = Settings::default();
            save_settings(store, &settings)
                .map_err(|e| anyhow::anyhow!("{} ({})", e, e.suggestion()))?;
            Display::show_settings_saved(&settings);
        }
    }
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pomotimer::cli::SetArgs;
    use pomotimer::engine::ManualClock;
    use pomotimer::storage::MemoryStore;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["pomotimer"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["pomotimer", "run"]);
        assert!(matches!(cli.command, Some(Commands::Run(_))));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["pomotimer", "--verbose", "status"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_settings_set_persists() {
        let store = MemoryStore::new();
        let args = SetArgs {
            focus: Some(50),
            ..Default::default()
        };

        execute_settings(&store, SettingsCommand::Set(args)).unwrap();

        assert_eq!(load_settings(&store).focus_minutes, 50);
    }

    #[test]
    fn test_settings_set_without_values_fails() {
        let store = MemoryStore::new();
        let result = execute_settings(&store, SettingsCommand::Set(SetArgs::default()));
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_reset_restores_defaults() {
        let store = MemoryStore::new();
        save_settings(&store, &Settings::default().with_focus_minutes(5)).unwrap();

        execute_settings(&store, SettingsCommand::Reset).unwrap();

        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn test_status_report_uses_clock_for_today() {
        let store = Arc::new(MemoryStore::new());
        store.set("completedSessions", "3").unwrap();
        store.set("lastActiveDay", "2024-05-01").unwrap();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap());

        let report = status_report(store, &clock);

        assert_eq!(report.today, "2024-05-02");
        assert_eq!(report.completed_sessions, 3);
        assert!(Display::render_status_report(&report).contains("Sessions today: 0"));
    }

    #[test]
    fn test_status_report_on_empty_store() {
        let report = status_report(Arc::new(MemoryStore::new()), &SystemClock);
        assert_eq!(report.completed_sessions, 0);
        assert!(report.last_active_day.is_none());
        assert!(report.snapshot.is_none());
        assert_eq!(report.settings, Settings::default());
    }
}
