//! Configuration module for EchoVerse.
//!
//! Provides `AppConfig` (top-level settings), one sub-config per subsystem,
//! `AppPaths` for the platform config directory, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.
//!
//! A missing `settings.toml` is never an error: every field has a default.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, FetchConfig, GeneratorConfig, SpeechConfig, UiConfig};
