//! Speech synthesis module.
//!
//! # Flow
//!
//! ```text
//! explanation ──▶ SpeechSynthesizer::synthesize ──▶ AudioArtifact (temp .wav)
//!                                                        │
//!                                       into_clip() reads + deletes
//!                                                        ▼
//!                                                  AudioClip (bytes) ──▶ player
//! ```

pub mod artifact;
pub mod synthesizer;

pub use artifact::{AudioArtifact, AudioClip};
pub use synthesizer::{EspeakSynthesizer, SpeechSynthesizer, SynthesisError};
