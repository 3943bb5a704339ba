//! Sound playback for the completion chime.
//!
//! The real backend uses rodio and is compiled only with the `sound`
//! feature. Without it, [`try_create_player`] returns `None` and the alert
//! falls back to the terminal bell alone.
//!
//! ```rust,no_run
//! use pomotimer::sound::try_create_player;
//!
//! if let Some(player) = try_create_player(false) {
//!     let _ = player.play_chime();
//! }
//! ```

mod error;
#[cfg(feature = "sound")]
mod player;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

pub use error::SoundError;
#[cfg(feature = "sound")]
pub use player::RodioSoundPlayer;

/// Audio backend used by `ChimeAlert`.
pub trait SoundPlayer {
    /// Starts playing the completion chime without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if playback cannot be started.
    fn play_chime(&self) -> Result<(), SoundError>;
}

/// Creates a sound player, returning None if audio is unavailable or
/// `disabled` is set.
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<Arc<dyn SoundPlayer>> {
    if disabled {
        debug!("Sound disabled by user");
        return None;
    }

    #[cfg(feature = "sound")]
    {
        match RodioSoundPlayer::new() {
            Ok(player) => Some(Arc::new(player)),
            Err(e) => {
                tracing::warn!("Audio not available, sound disabled: {}", e);
                None
            }
        }
    }

    #[cfg(not(feature = "sound"))]
    {
        debug!("Built without the `sound` feature, chime disabled");
        None
    }
}

/// Counts chimes instead of playing them.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    plays: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of successful plays.
    #[must_use]
    pub fn play_count(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play_chime(&self) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::ChimeFailed("mock failure".to_string()));
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
