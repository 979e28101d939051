//! Text generation: turns input text into an explanation.
//!
//! This module provides:
//! * [`Generator`]: async trait implemented by all generation backends.
//! * [`ApiGenerator`]: OpenAI-compatible `/v1/completions` backend.
//! * [`GenerationError`]: error variants for generation calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use echoverse::config::AppConfig;
//! use echoverse::generate::{ApiGenerator, Generator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = ApiGenerator::from_config(&config.generator);
//!
//!     let explanation = generator.generate("Photosynthesis is").await.unwrap();
//!     println!("{explanation}");
//! }
//! ```

pub mod generator;

pub use generator::{parse_completion, ApiGenerator, GenerationError, Generator};
