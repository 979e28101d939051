//! Session state machine.
//!
//! [`Session`] is the only stateful component.  It remembers the selected
//! [`InputMode`], the current input text and the last explanation, and each
//! user action is a method taking the collaborator it needs:
//!
//! ```text
//! select_mode ──▶ mode := m, input cleared, explanation kept
//! provide_text / load_document / fetch_link ──▶ input := text (cleared on failure)
//! explain ──▶ input blank?  no-op
//!             else          explanation := generator(input)
//! speak   ──▶ explanation empty?  rejected
//!             else                synthesize → read clip → delete artifact
//! ```
//!
//! Nothing here is shared or locked; the worker owns the session and
//! handles one action at a time.

use std::fmt;

use thiserror::Error;

use crate::extract::{DocumentExtractor, DocumentSource, FetchError, LinkSource, ParseError};
use crate::generate::{GenerationError, Generator};
use crate::speech::{AudioClip, SpeechSynthesizer, SynthesisError};

// ---------------------------------------------------------------------------
// InputMode
// ---------------------------------------------------------------------------

/// Where the input text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Uploaded PDF document.
    Pdf,
    /// Fetched URL.
    Link,
    /// Typed by the user.
    #[default]
    Text,
}

impl InputMode {
    pub const ALL: [InputMode; 3] = [InputMode::Pdf, InputMode::Link, InputMode::Text];

    /// Label shown on the mode selector.
    pub fn label(&self) -> &'static str {
        match self {
            InputMode::Pdf => "PDF",
            InputMode::Link => "Link",
            InputMode::Text => "Text",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Failures surfaced to the UI.  None of them end the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An extraction path was used while another mode is selected.
    #[error("this action needs {expected} mode, but {actual} mode is selected")]
    WrongMode { expected: InputMode, actual: InputMode },

    /// Speak was requested before anything was explained.
    #[error("nothing to speak yet; press Explain first")]
    NothingToSpeak,

    #[error("could not read the document: {0}")]
    Parse(#[from] ParseError),

    #[error("could not fetch the link: {0}")]
    Fetch(#[from] FetchError),

    #[error("could not generate an explanation: {0}")]
    Generation(#[from] GenerationError),

    #[error("could not synthesize speech: {0}")]
    Synthesis(#[from] SynthesisError),

    /// The synthesized audio could not be read back.
    #[error("could not read synthesized audio: {0}")]
    Artifact(#[source] std::io::Error),
}

// ---------------------------------------------------------------------------
// ExplainOutcome / TextPreview
// ---------------------------------------------------------------------------

/// Result of a successful [`Session::explain`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainOutcome {
    /// A new explanation replaced the old one.
    Explained,
    /// The input was blank; nothing changed.
    Skipped,
}

/// Upper bound on preview length, whatever the configured value.
pub const MAX_PREVIEW_CHARS: usize = 1000;

/// The head of the input text for display, plus its full size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPreview {
    /// At most `limit` characters, never splitting a character.
    pub text: String,
    /// Character count of the full input.
    pub total_chars: usize,
}

impl TextPreview {
    pub fn of(text: &str, limit: usize) -> Self {
        Self {
            text: text.chars().take(limit).collect(),
            total_chars: text.chars().count(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.text.chars().count() < self.total_chars
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Per-session state: input mode, input text and the last explanation.
#[derive(Debug, Clone, Default)]
pub struct Session {
    mode: InputMode,
    raw_text: String,
    explanation: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Full input text (not truncated).
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Last explanation; empty until the first successful explain.
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn has_explanation(&self) -> bool {
        !self.explanation.is_empty()
    }

    /// Switch input mode.  The input text belongs to the previous mode and
    /// is dropped; the explanation survives.
    pub fn select_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            log::debug!("session: mode {} → {}", self.mode, mode);
        }
        self.mode = mode;
        self.raw_text.clear();
    }

    /// Set the input text for the current mode.
    pub fn provide_text(&mut self, raw: impl Into<String>) {
        self.raw_text = raw.into();
    }

    /// PDF path: extract the whole document into the input text.
    ///
    /// On failure the input is left empty.
    pub fn load_document(
        &mut self,
        source: DocumentSource,
        extractor: &dyn DocumentExtractor,
    ) -> Result<(), SessionError> {
        self.require_mode(InputMode::Pdf)?;
        self.raw_text.clear();

        let name = source.name();
        let bytes = source.into_bytes()?;
        let text = extractor.extract(&bytes)?;

        log::info!(
            "session: extracted {} chars from {name}",
            text.chars().count()
        );
        self.raw_text = text;
        Ok(())
    }

    /// Link path: fetch `url` into the input text.
    ///
    /// On failure the input is left empty.
    pub async fn fetch_link(
        &mut self,
        url: &str,
        source: &dyn LinkSource,
    ) -> Result<(), SessionError> {
        self.require_mode(InputMode::Link)?;
        self.raw_text.clear();

        let text = source.fetch(url).await?;

        log::info!("session: fetched {} chars", text.chars().count());
        self.raw_text = text;
        Ok(())
    }

    /// First `limit` characters of the input, for display.  `limit` is
    /// capped at [`MAX_PREVIEW_CHARS`].
    pub fn preview(&self, limit: usize) -> TextPreview {
        TextPreview::of(&self.raw_text, limit.min(MAX_PREVIEW_CHARS))
    }

    /// Generate an explanation of the full input text.
    ///
    /// Blank input is a no-op.  A failed generation leaves the previous
    /// explanation in place.
    pub async fn explain(
        &mut self,
        generator: &dyn Generator,
    ) -> Result<ExplainOutcome, SessionError> {
        if self.raw_text.trim().is_empty() {
            log::debug!("session: explain skipped, input is blank");
            return Ok(ExplainOutcome::Skipped);
        }

        let explanation = generator.generate(&self.raw_text).await?;
        self.explanation = explanation;

        log::info!(
            "session: explanation ready ({} chars)",
            self.explanation.chars().count()
        );
        Ok(ExplainOutcome::Explained)
    }

    /// Synthesize the explanation and return it as an in-memory clip.
    ///
    /// The temporary artifact is deleted before this returns, on success
    /// and on failure.
    pub fn speak(&self, synthesizer: &dyn SpeechSynthesizer) -> Result<AudioClip, SessionError> {
        if self.explanation.is_empty() {
            return Err(SessionError::NothingToSpeak);
        }

        let artifact = synthesizer.synthesize(&self.explanation)?;
        let clip = artifact.into_clip().map_err(SessionError::Artifact)?;

        log::info!("session: speech clip ready ({} bytes)", clip.len());
        Ok(clip)
    }

    fn require_mode(&self, expected: InputMode) -> Result<(), SessionError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(SessionError::WrongMode {
                expected,
                actual: self.mode,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
