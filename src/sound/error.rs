//! Errors raised while opening the audio device or playing the chime.
//!
//! None of them reach the engine; `ChimeAlert` logs and drops them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoundError {
    /// No default output device could be opened.
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),

    /// The device opened but refused a new sink.
    #[error("cannot open a sink on the audio device: {0}")]
    SinkUnavailable(String),

    #[error("chime playback failed: {0}")]
    ChimeFailed(String),
}

impl SoundError {
    /// Hint printed next to the error in logs.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NoOutputDevice(_) => "Connect an audio output device or run with --no-sound",
            Self::SinkUnavailable(_) => "Check that no other program holds the audio device",
            Self::ChimeFailed(_) => "Run with --no-sound to silence the chime",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_cause() {
        let cases = [
            SoundError::NoOutputDevice("alsa: no card".to_string()),
            SoundError::SinkUnavailable("busy".to_string()),
            SoundError::ChimeFailed("decoder".to_string()),
        ];
        for (err, cause) in cases.iter().zip(["alsa: no card", "busy", "decoder"]) {
            assert!(err.to_string().contains(cause));
        }
    }

    #[test]
    fn test_every_suggestion_mentions_a_fix() {
        assert!(SoundError::NoOutputDevice(String::new())
            .suggestion()
            .contains("--no-sound"));
        assert!(SoundError::SinkUnavailable(String::new())
            .suggestion()
            .contains("audio device"));
        assert!(SoundError::ChimeFailed(String::new())
            .suggestion()
            .contains("--no-sound"));
    }
}
