//! Audio output: synthesized clip → decode → mono → device rate → speaker.
//!
//! # Pipeline
//!
//! ```text
//! AudioClip (WAV bytes) → decode_wav (hound) → downmix_to_mono
//!                       → resample → cpal output stream
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use echoverse::audio::AudioPlayer;
//! use echoverse::speech::AudioClip;
//!
//! let clip = AudioClip { bytes: std::fs::read("hello.wav").unwrap() };
//! let mut player = AudioPlayer::new().unwrap();
//! player.play(&clip).unwrap();
//! ```

pub mod decode;
pub mod playback;
pub mod resample;

pub use decode::{decode_wav, DecodedAudio};
pub use playback::AudioPlayer;
pub use resample::{downmix_to_mono, resample};

use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding or playing a clip.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("cannot decode audio clip: {0}")]
    Decode(#[from] hound::Error),
}
