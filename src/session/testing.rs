//! Test doubles shared by the session tests.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::extract::{FetchError, LinkSource};
use crate::generate::{GenerationError, Generator};
use crate::speech::{AudioArtifact, SpeechSynthesizer, SynthesisError};

/// Returns the input followed by a fixed gloss.
pub struct EchoSuffixGenerator;

#[async_trait]
impl Generator for EchoSuffixGenerator {
    async fn generate(&self, text: &str) -> Result<String, GenerationError> {
        Ok(format!("{text}\nIn simple words, this is about the topic above."))
    }
}

pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _text: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Timeout)
    }
}

/// Serves the same body for every URL.
pub struct FixedLink(pub String);

#[async_trait]
impl LinkSource for FixedLink {
    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        Ok(self.0.clone())
    }
}

/// Writes the text itself as "audio" and remembers every artifact path.
#[derive(Default)]
pub struct RecordingSynthesizer {
    fail: bool,
    paths: Mutex<Vec<PathBuf>>,
}

impl RecordingSynthesizer {
    /// Creates the artifact, then reports an empty output.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn synthesize(&self, text: &str) -> Result<AudioArtifact, SynthesisError> {
        let artifact = AudioArtifact::create()?;
        self.paths.lock().unwrap().push(artifact.path().to_path_buf());

        if self.fail {
            return Err(SynthesisError::EmptyOutput);
        }
        std::fs::write(artifact.path(), text)?;
        Ok(artifact)
    }
}
