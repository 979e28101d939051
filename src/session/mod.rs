//! Session: the input/explanation state machine and the worker driving it.
//!
//! | Sub-module | Contents |
//! |------------|----------|
//! | [`state`]  | [`Session`], [`InputMode`], [`TextPreview`], [`SessionError`] |
//! | [`runner`] | [`SessionWorker`], [`SessionCommand`], [`SessionEvent`] |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use echoverse::config::AppConfig;
//! use echoverse::extract::{LinkFetcher, PdfExtractor};
//! use echoverse::generate::ApiGenerator;
//! use echoverse::session::{SessionCommand, SessionWorker};
//! use echoverse::speech::EspeakSynthesizer;
//!
//! # async fn example() {
//! let config = AppConfig::default();
//! let worker = SessionWorker::new(
//!     Arc::new(ApiGenerator::from_config(&config.generator)),
//!     Arc::new(LinkFetcher::from_config(&config.fetch)),
//!     Arc::new(PdfExtractor::new()),
//!     Arc::new(EspeakSynthesizer::from_config(&config.speech)),
//!     config.ui.preview_chars,
//! );
//!
//! let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
//! let (event_tx, _event_rx) = tokio::sync::mpsc::channel(32);
//! command_tx.send(SessionCommand::ProvideText("Photosynthesis".into())).await.unwrap();
//! command_tx.send(SessionCommand::Explain).await.unwrap();
//! drop(command_tx);
//!
//! let session = worker.run(command_rx, event_tx).await;
//! println!("{}", session.explanation());
//! # }
//! ```

pub mod runner;
pub mod state;

#[cfg(test)]
mod testing;

pub use runner::{Activity, SessionCommand, SessionEvent, SessionWorker};
pub use state::{
    ExplainOutcome, InputMode, Session, SessionError, TextPreview, MAX_PREVIEW_CHARS,
};
