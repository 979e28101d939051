//! Speech synthesizer trait and the eSpeak NG backend.
//!
//! [`SpeechSynthesizer`] is the interface used by the session.  It is
//! object-safe and `Send + Sync` so it can live behind an
//! `Arc<dyn SpeechSynthesizer>` and be driven from the blocking pool.
//!
//! [`EspeakSynthesizer`] shells out to the `espeak-ng` command-line engine,
//! feeding the text on stdin and asking for a WAV file (`-w`) at the
//! artifact's temporary path.

use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::SpeechConfig;
use crate::speech::artifact::AudioArtifact;

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// Errors that can arise while synthesizing speech.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The engine executable could not be started.
    #[error("cannot start speech engine {binary:?}: {reason}")]
    EngineStart { binary: String, reason: String },

    /// The engine ran but reported failure.
    #[error("speech engine failed ({status}): {stderr}")]
    EngineFailed { status: String, stderr: String },

    /// The temporary artifact could not be created or written.
    #[error("cannot write audio artifact: {0}")]
    Write(#[from] std::io::Error),

    /// The engine exited cleanly but wrote no audio.
    #[error("speech engine produced no audio")]
    EmptyOutput,
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Blocking text → audio artifact synthesis.
///
/// The returned [`AudioArtifact`] is owned by the caller, who reads it back
/// and lets it drop; the synthesizer does not track it after creation.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<AudioArtifact, SynthesisError>;
}

// Compile-time assertion: Box<dyn SpeechSynthesizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechSynthesizer>) {}
};

// ---------------------------------------------------------------------------
// EspeakSynthesizer
// ---------------------------------------------------------------------------

/// Production synthesizer driving the `espeak-ng` CLI.
#[derive(Debug, Clone)]
pub struct EspeakSynthesizer {
    config: SpeechConfig,
}

impl EspeakSynthesizer {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn command(&self, artifact: &AudioArtifact) -> Command {
        let mut cmd = Command::new(&self.config.engine_binary);
        cmd.arg("-w").arg(artifact.path());
        if let Some(voice) = &self.config.voice {
            cmd.arg("-v").arg(voice);
        }
        if let Some(wpm) = self.config.words_per_minute {
            cmd.arg("-s").arg(wpm.to_string());
        }
        cmd.arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl SpeechSynthesizer for EspeakSynthesizer {
    fn synthesize(&self, text: &str) -> Result<AudioArtifact, SynthesisError> {
        // Any early return below drops `artifact`, which removes the file.
        let artifact = AudioArtifact::create()?;

        let mut child = self
            .command(&artifact)
            .spawn()
            .map_err(|e| SynthesisError::EngineStart {
                binary: self.config.engine_binary.clone(),
                reason: e.to_string(),
            })?;

        // A write error (EPIPE when the engine quits early) is held back
        // until the engine is reaped; its exit status and stderr say more.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(SynthesisError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        if std::fs::metadata(artifact.path())?.len() == 0 {
            return Err(SynthesisError::EmptyOutput);
        }

        log::debug!(
            "speech: synthesized {} chars into {}",
            text.chars().count(),
            artifact.path().display()
        );
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
