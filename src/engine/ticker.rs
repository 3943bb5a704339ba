//! Cancellable one-second tick source.
//!
//! The session loop owns a single [`TickSource`]. Arming always cancels the
//! previous task first, and every tick carries the generation it was armed
//! with, so a tick that raced with a cancel is dropped instead of being
//! counted twice.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::trace;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A repeating timer that can be armed and cancelled.
#[derive(Debug)]
pub struct TickSource {
    period: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<u64>,
    rx: mpsc::UnboundedReceiver<u64>,
}

impl TickSource {
    /// Creates an unarmed tick source with the given period.
    pub fn new(period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            period,
            generation: 0,
            handle: None,
            tx,
            rx,
        }
    }

    /// Arms the source. The first tick fires one full period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self) {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let period = self.period;
        let tx = self.tx.clone();

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tx.send(generation).is_err() {
                    break;
                }
            }
        }));

        trace!("Tick source armed (generation {})", generation);
    }

    /// Cancels the source. Does nothing if it is not armed.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            trace!("Tick source cancelled (generation {})", self.generation);
        }
    }

    /// Cancels and re-arms when `running`, or just cancels otherwise.
    pub fn rearm(&mut self, running: bool) {
        if running {
            self.arm();
        } else {
            self.cancel();
        }
    }

    /// Returns true if a tick task is currently armed.
    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Waits for the next tick of the current generation.
    ///
    /// Pending forever while unarmed. Cancel safe, so it can sit in a
    /// `tokio::select!` branch.
    pub async fn next(&mut self) {
        loop {
            let Some(generation) = self.rx.recv().await else {
                // Unreachable while `self.tx` is alive.
                std::future::pending::<()>().await;
                return;
            };

            if self.handle.is_some() && generation == self.generation {
                return;
            }
            trace!("Dropping stale tick (generation {})", generation);
        }
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.cancel();
    }
}
