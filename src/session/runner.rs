//! Session worker: runs user actions against the [`Session`] on tokio.
//!
//! The UI sends [`SessionCommand`]s and polls [`SessionEvent`]s back.
//! Commands are handled strictly in arrival order, so a Speak queued behind
//! an Explain always reads the new explanation.
//!
//! ```text
//! LoadDocument ─▶ Busy(Extracting) ─▶ spawn_blocking(parse)
//!                                      ─▶ TextReady | TextCleared + Failed
//! FetchLink    ─▶ Busy(Fetching)   ─▶ fetcher (async)
//!                                      ─▶ TextReady | TextCleared + Failed
//! Explain      ─▶ Busy(Explaining) ─▶ generator (async)
//!                                      ─▶ ExplanationReady | ExplainSkipped | Failed
//! Speak        ─▶ Busy(Speaking)   ─▶ spawn_blocking(tts)
//!                                      ─▶ AudioReady | Failed
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::extract::{DocumentExtractor, DocumentSource, LinkSource};
use crate::generate::Generator;
use crate::speech::{AudioClip, SpeechSynthesizer};

use super::state::{
    ExplainOutcome, InputMode, Session, SessionError, TextPreview, MAX_PREVIEW_CHARS,
};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// UI → worker.
#[derive(Debug)]
pub enum SessionCommand {
    SelectMode(InputMode),
    ProvideText(String),
    LoadDocument(DocumentSource),
    FetchLink(String),
    Explain,
    Speak,
}

impl SessionCommand {
    /// Command name for logs; never includes user text.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionCommand::SelectMode(_) => "select-mode",
            SessionCommand::ProvideText(_) => "provide-text",
            SessionCommand::LoadDocument(_) => "load-document",
            SessionCommand::FetchLink(_) => "fetch-link",
            SessionCommand::Explain => "explain",
            SessionCommand::Speak => "speak",
        }
    }
}

/// Long-running step the worker is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Extracting,
    Fetching,
    Explaining,
    Speaking,
}

impl Activity {
    /// Status-line text.
    pub fn label(&self) -> &'static str {
        match self {
            Activity::Extracting => "Reading document...",
            Activity::Fetching => "Fetching link...",
            Activity::Explaining => "Generating explanation...",
            Activity::Speaking => "Synthesizing speech...",
        }
    }
}

/// Worker → UI.
///
/// Every `Busy` is followed by exactly one of `TextReady`, `Failed`,
/// `ExplanationReady`, `ExplainSkipped` or `AudioReady`.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Busy(Activity),
    /// New input text is in place.
    TextReady(TextPreview),
    /// The input text was dropped (mode switch or failed extraction).
    TextCleared,
    ExplanationReady(String),
    /// Explain was requested with blank input.
    ExplainSkipped,
    AudioReady(AudioClip),
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// SessionWorker
// ---------------------------------------------------------------------------

/// Owns the session and its collaborators.
///
/// Create with [`SessionWorker::new`], then spawn [`run`](Self::run) on the
/// tokio runtime.
pub struct SessionWorker {
    session: Session,
    generator: Arc<dyn Generator>,
    fetcher: Arc<dyn LinkSource>,
    extractor: Arc<dyn DocumentExtractor>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    preview_chars: usize,
}

impl SessionWorker {
    pub fn new(
        generator: Arc<dyn Generator>,
        fetcher: Arc<dyn LinkSource>,
        extractor: Arc<dyn DocumentExtractor>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        preview_chars: usize,
    ) -> Self {
        Self {
            session: Session::new(),
            generator,
            fetcher,
            extractor,
            synthesizer,
            preview_chars: preview_chars.min(MAX_PREVIEW_CHARS),
        }
    }

    /// Process commands until `command_rx` is closed, then hand back the
    /// final session.
    pub async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<SessionCommand>,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> Session {
        while let Some(command) = command_rx.recv().await {
            let events = self.handle(command).await;
            for event in events {
                // The UI may already be gone during shutdown.
                let _ = event_tx.send(event).await;
            }
        }

        log::info!("session: command channel closed, worker shutting down");
        self.session
    }

    async fn handle(&mut self, command: SessionCommand) -> Vec<SessionEvent> {
        log::debug!("session: handling {}", command.kind());
        match command {
            SessionCommand::SelectMode(mode) => {
                self.session.select_mode(mode);
                vec![SessionEvent::TextCleared]
            }

            SessionCommand::ProvideText(text) => {
                self.session.provide_text(text);
                vec![SessionEvent::TextReady(self.preview())]
            }

            SessionCommand::LoadDocument(source) => {
                let mut events = vec![SessionEvent::Busy(Activity::Extracting)];
                match self.load_document(source).await {
                    Ok(()) => events.push(SessionEvent::TextReady(self.preview())),
                    Err(message) => {
                        events.push(SessionEvent::TextCleared);
                        events.push(failed(message));
                    }
                }
                events
            }

            SessionCommand::FetchLink(url) => {
                let mut events = vec![SessionEvent::Busy(Activity::Fetching)];
                match self.session.fetch_link(&url, self.fetcher.as_ref()).await {
                    Ok(()) => events.push(SessionEvent::TextReady(self.preview())),
                    Err(e) => {
                        events.push(SessionEvent::TextCleared);
                        events.push(failed(e.to_string()));
                    }
                }
                events
            }

            SessionCommand::Explain => {
                let mut events = vec![SessionEvent::Busy(Activity::Explaining)];
                events.push(match self.session.explain(self.generator.as_ref()).await {
                    Ok(ExplainOutcome::Explained) => {
                        SessionEvent::ExplanationReady(self.session.explanation().to_string())
                    }
                    Ok(ExplainOutcome::Skipped) => SessionEvent::ExplainSkipped,
                    Err(e) => failed(e.to_string()),
                });
                events
            }

            SessionCommand::Speak => {
                let mut events = vec![SessionEvent::Busy(Activity::Speaking)];
                events.push(match self.speak().await {
                    Ok(clip) => SessionEvent::AudioReady(clip),
                    Err(message) => failed(message),
                });
                events
            }
        }
    }

    /// PDF parsing is CPU-bound; run it on a draft copy in the blocking pool
    /// and adopt the draft once the task has finished.
    async fn load_document(&mut self, source: DocumentSource) -> Result<(), String> {
        let mut draft = self.session.clone();
        let extractor = Arc::clone(&self.extractor);

        let joined = tokio::task::spawn_blocking(move || {
            let result = draft.load_document(source, extractor.as_ref());
            (draft, result)
        })
        .await;

        match joined {
            Ok((draft, result)) => {
                self.session = draft;
                result.map_err(|e| e.to_string())
            }
            Err(e) => {
                // The draft is lost with the task; mirror the failure policy.
                self.session.provide_text(String::new());
                Err(format!("internal error while reading the document: {e}"))
            }
        }
    }

    async fn speak(&self) -> Result<AudioClip, String> {
        if !self.session.has_explanation() {
            return Err(SessionError::NothingToSpeak.to_string());
        }

        let session = self.session.clone();
        let synthesizer = Arc::clone(&self.synthesizer);

        match tokio::task::spawn_blocking(move || session.speak(synthesizer.as_ref())).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("internal error while synthesizing speech: {e}")),
        }
    }

    fn preview(&self) -> TextPreview {
        self.session.preview(self.preview_chars)
    }
}

fn failed(message: String) -> SessionEvent {
    log::error!("session: {message}");
    SessionEvent::Failed { message }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
