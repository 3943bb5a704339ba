//! Completion alerts.
//!
//! The engine calls [`AlertDispatcher::notify_completion`] when a countdown
//! reaches zero on its own. Dispatch is fire-and-forget: implementations
//! log their own failures and never report them back to the engine.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::sound::SoundPlayer;

/// ASCII BEL, the terminal's stand-in for haptic feedback.
const BELL: &[u8] = b"\x07";

/// Single-method collaborator invoked on natural completion.
pub trait AlertDispatcher {
    fn notify_completion(&self);
}

/// Plays the completion chime and rings the terminal bell.
pub struct ChimeAlert {
    player: Option<Arc<dyn SoundPlayer>>,
    bell: bool,
}

impl ChimeAlert {
    /// Creates an alert. With no player only the bell is used.
    pub fn new(player: Option<Arc<dyn SoundPlayer>>, bell: bool) -> Self {
        Self { player, bell }
    }

    fn ring_bell() -> std::io::Result<()> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(BELL)?;
        stderr.flush()
    }
}

impl AlertDispatcher for ChimeAlert {
    fn notify_completion(&self) {
        if let Some(player) = &self.player {
            if let Err(e) = player.play_chime() {
                warn!("Completion chime failed: {} ({})", e, e.suggestion());
            }
        }

        if self.bell {
            if let Err(e) = Self::ring_bell() {
                warn!("Failed to ring terminal bell: {}", e);
            }
        }

        debug!("Completion alert dispatched");
    }
}

impl std::fmt::Debug for ChimeAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChimeAlert")
            .field("sound", &self.player.is_some())
            .field("bell", &self.bell)
            .finish()
    }
}

/// Mock alert for testing.
#[derive(Debug, Default)]
pub struct MockAlert {
    calls: AtomicUsize,
}

impl MockAlert {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AlertDispatcher for MockAlert {
    fn notify_completion(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::MockSoundPlayer;

    #[test]
    fn test_chime_alert_plays_sound() {
        let player = Arc::new(MockSoundPlayer::new());
        let alert = ChimeAlert::new(Some(player.clone()), false);

        alert.notify_completion();

        assert_eq!(player.play_count(), 1);
    }

    #[test]
    fn test_chime_alert_swallows_sound_failure() {
        let player = Arc::new(MockSoundPlayer::new());
        player.set_should_fail(true);
        let alert = ChimeAlert::new(Some(player.clone()), false);

        alert.notify_completion();

        assert_eq!(player.play_count(), 0);
    }

    #[test]
    fn test_chime_alert_without_player() {
        let alert = ChimeAlert::new(None, true);
        alert.notify_completion();
    }

    #[test]
    fn test_chime_alert_debug() {
        let alert = ChimeAlert::new(None, true);
        let debug_str = format!("{:?}", alert);
        assert!(debug_str.contains("sound: false"));
        assert!(debug_str.contains("bell: true"));
    }

    #[test]
    fn test_mock_alert_counts_calls() {
        let alert = MockAlert::new();
        alert.notify_completion();
        alert.notify_completion();
        assert_eq!(alert.call_count(), 2);
    }
}
