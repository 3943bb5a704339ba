//! rodio backend for the completion chime.
//!
//! The completion chime is synthesized (two short sine tones), so no audio
//! asset has to ship with the binary.

use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use super::error::SoundError;
use super::SoundPlayer;

/// Chime tones as (frequency in Hz, duration in ms).
const CHIME: [(f32, u64); 2] = [(880.0, 180), (1320.0, 260)];

/// Output volume of the chime.
const CHIME_VOLUME: f32 = 0.25;

/// Plays the chime on the default output device.
///
/// Playback is non-blocking; the chime keeps playing after `play_chime`
/// returns as long as the player is alive.
pub struct RodioSoundPlayer {
    // Dropping the stream silences every detached sink.
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioSoundPlayer {
    /// Opens the default audio output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::NoOutputDevice` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::NoOutputDevice(e.to_string()))?;

        debug!("Audio output opened for the chime");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }
}

impl SoundPlayer for RodioSoundPlayer {
    fn play_chime(&self) -> Result<(), SoundError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::SinkUnavailable(e.to_string()))?;

        for (frequency, millis) in CHIME {
            sink.append(
                SineWave::new(frequency)
                    .take_duration(Duration::from_millis(millis))
                    .amplify(CHIME_VOLUME),
            );
        }
        sink.detach();

        debug!("Chime playback started (detached)");
        Ok(())
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests may run without audio hardware (e.g., CI containers), so
    // a failed device open just ends the test.

    #[test]
    fn test_play_chime_when_device_present() {
        let Ok(player) = RodioSoundPlayer::new() else {
            return;
        };
        assert!(player.play_chime().is_ok());
    }

    #[test]
    fn test_debug_impl() {
        let Ok(player) = RodioSoundPlayer::new() else {
            return;
        };
        assert!(format!("{:?}", player).contains("RodioSoundPlayer"));
    }
}
