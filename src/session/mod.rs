//! Interactive timer session.
//!
//! The session is the single event loop that drives the engine. It
//! serializes four sources with `tokio::select!`:
//! - ticks from the [`TickSource`]
//! - command lines from the input stream
//! - host lifecycle events
//! - engine events, rendered after every step
//!
//! The tick source is re-armed only after a command that changed the
//! countdown; re-arming always cancels the old one first.

pub mod lifecycle;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::alert::AlertDispatcher;
use crate::cli::display::Display;
use crate::cli::input::{parse_command, SessionCommand};
use crate::engine::{Clock, TickSource, TimerEngine, TimerEvent};
use crate::storage::{save_settings, KeyValueStore, PersistentCounters};
use crate::types::{Settings, TimerView};

pub use lifecycle::{LifecycleEvent, LifecycleSubscription};

/// Options for a session run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Start the countdown right away
    pub start: bool,
}

/// Why the session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The user asked to quit
    Quit,
    /// The host moved to the background (shutdown signal)
    Backgrounded,
}

/// An interactive session hosting one timer engine.
pub struct Session {
    engine: TimerEngine,
    events: mpsc::UnboundedReceiver<TimerEvent>,
    ticker: TickSource,
    store: Arc<dyn KeyValueStore>,
    options: SessionOptions,
}

impl Session {
    /// Creates a session with a fresh engine backed by `store`.
    pub fn new(
        settings: Settings,
        store: Arc<dyn KeyValueStore>,
        alert: Arc<dyn AlertDispatcher>,
        clock: Arc<dyn Clock>,
        options: SessionOptions,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let engine = TimerEngine::new(
            settings,
            PersistentCounters::new(store.clone()),
            alert,
            clock,
            tx,
        );

        Self {
            engine,
            events,
            ticker: TickSource::default(),
            store,
            options,
        }
    }

    /// Replaces the tick source (tests use a shorter period).
    pub fn with_ticker(mut self, ticker: TickSource) -> Self {
        self.ticker = ticker;
        self
    }

    /// Returns the hosted engine.
    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    /// Runs the session until the user quits or the host is backgrounded.
    ///
    /// Closing the input stream does not end the session; the countdown
    /// keeps going until a lifecycle event arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from `input` fails.
    pub async fn run<R>(
        &mut self,
        input: R,
        mut lifecycle: LifecycleSubscription,
    ) -> Result<SessionExit>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut input_open = true;

        // Starting up is a return to the foreground.
        self.engine.handle_foreground();
        if self.options.start {
            self.engine.start();
        }
        self.ticker.rearm(self.engine.is_running());
        self.render_events();
        Display::show_view(&self.engine.view());

        let exit = loop {
            tokio::select! {
                _ = self.ticker.next() => {
                    self.engine.tick();
                }
                line = lines.next_line(), if input_open => {
                    match line.context("Failed to read command")? {
                        Some(line) => {
                            let before = self.engine.view();
                            if self.handle_line(&line) == Flow::Quit {
                                self.engine.handle_background();
                                break SessionExit::Quit;
                            }
                            if countdown_changed(&before, &self.engine.view()) {
                                self.ticker.rearm(self.engine.is_running());
                            }
                        }
                        None => {
                            debug!("Input closed");
                            input_open = false;
                        }
                    }
                }
                event = lifecycle.next() => match event {
                    LifecycleEvent::Background => {
                        self.engine.handle_background();
                        break SessionExit::Backgrounded;
                    }
                    LifecycleEvent::Foreground => {
                        self.engine.handle_foreground();
                        self.ticker.rearm(self.engine.is_running());
                    }
                }
            }
            self.render_events();
        };

        self.ticker.cancel();
        self.render_events();
        Display::show_goodbye(&self.engine.view());
        Ok(exit)
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                Display::show_error(&e.to_string());
                return Flow::Continue;
            }
        };

        debug!("Command: {:?}", command);
        match command {
            SessionCommand::Start => self.engine.start(),
            SessionCommand::Pause => self.engine.pause(),
            SessionCommand::Toggle => self.engine.toggle(),
            SessionCommand::Reset => self.engine.reset(),
            SessionCommand::Skip => self.engine.skip(),
            SessionCommand::Switch(mode) => self.engine.switch_mode(mode),
            SessionCommand::Set(field, value) => {
                let settings = field.apply(*self.engine.settings(), value);
                self.apply_setting(settings);
            }
            SessionCommand::Status => {
                Display::show_status(&self.engine.view(), self.engine.settings())
            }
            SessionCommand::Help => Display::show_help(),
            SessionCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn apply_setting(&mut self, settings: Settings) {
        if let Err(e) = settings.validate() {
            Display::show_error(&format!("{} ({})", e, e.suggestion()));
            return;
        }

        if let Err(e) = save_settings(self.store.as_ref(), &settings) {
            warn!("Settings not saved: {}", e);
        }
        self.engine.update_settings(settings);
        Display::show_settings(&settings);
    }

    fn render_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            Display::show_event(&event, &self.engine.view());
        }
    }
}

/// True when a command stopped, started or refilled the countdown, which
/// is when the partial second in flight must be discarded.
fn countdown_changed(before: &TimerView, after: &TimerView) -> bool {
    before.is_running != after.is_running
        || before.mode != after.mode
        || before.seconds_remaining != after.seconds_remaining
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}
