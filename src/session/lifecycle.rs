//! Host lifecycle events.
//!
//! A terminal process has no real foreground/background switch, so the
//! session maps the process lifecycle onto it: starting up is a return to
//! the foreground, and a shutdown request (Ctrl-C, SIGTERM, SIGHUP) is a
//! move to the background that ends the process. The suspend snapshot
//! written on the way out is reconciled by the next `run`.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A lifecycle transition of the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The host became active
    Foreground,
    /// The host is about to be suspended or terminated
    Background,
}

/// Subscription to the host's lifecycle events.
///
/// Dropping it tears down the signal listener.
#[derive(Debug)]
pub struct LifecycleSubscription {
    rx: mpsc::UnboundedReceiver<LifecycleEvent>,
    listener: Option<JoinHandle<()>>,
}

impl LifecycleSubscription {
    /// Subscribes to process shutdown signals.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_signals() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            let _ = tx.send(LifecycleEvent::Background);
        });

        Self {
            rx,
            listener: Some(listener),
        }
    }

    /// Creates a subscription fed by the returned sender (for testing and
    /// embedding hosts).
    pub fn manual() -> (mpsc::UnboundedSender<LifecycleEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx, listener: None })
    }

    /// Waits for the next lifecycle event. Pending forever once the source
    /// is gone.
    pub async fn next(&mut self) -> LifecycleEvent {
        match self.rx.recv().await {
            Some(event) => event,
            None => std::future::pending().await,
        }
    }
}

impl Drop for LifecycleSubscription {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            debug!("Lifecycle listener removed");
        }
    }
}

/// Waits for Ctrl-C, or SIGTERM/SIGHUP on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate()).ok();
        let mut hangup = signal(SignalKind::hangup()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            Some(_) = async {
                match terminate.as_mut() {
                    Some(s) => s.recv().await,
                    None => std::future::pending().await,
                }
            } => {}
            Some(_) = async {
                match hangup.as_mut() {
                    Some(s) => s.recv().await,
                    None => std::future::pending().await,
                }
            } => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
