//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to the worker
//! task.  Every struct is `#[serde(default)]`, so a hand-edited file only
//! needs the keys it wants to override.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

/// Settings for the text-generation backend.
///
/// The sampling configuration is fixed for the whole session: it is read
/// once at startup when the [`ApiGenerator`](crate::generate::ApiGenerator)
/// is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base URL of an OpenAI-compatible endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - vLLM / LM Studio: `http://localhost:8000`
    pub base_url: String,
    /// API key: `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Upper bound on generated tokens per call.
    pub max_tokens: u32,
    /// Stochastic sampling.  When `false` the request is sent with
    /// temperature 0 (greedy decoding).
    pub do_sample: bool,
    /// Sampling temperature used when `do_sample` is set.
    pub temperature: f32,
    /// Prefix the continuation with the input text, the way text-generation
    /// pipelines report `generated_text`.
    pub return_full_text: bool,
    /// Optional request timeout in seconds.  `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            max_tokens: 300,
            do_sample: true,
            temperature: 0.7,
            return_full_text: true,
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// FetchConfig
// ---------------------------------------------------------------------------

/// Settings for the URL text extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Optional request timeout in seconds.  `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Name or path of the eSpeak NG executable.
    pub engine_binary: String,
    /// Voice name passed with `-v` (e.g. `"en-us"`).  `None` uses the engine
    /// default.
    pub voice: Option<String>,
    /// Speaking rate passed with `-s`.  `None` uses the engine default.
    pub words_per_minute: Option<u32>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine_binary: "espeak-ng".into(),
            voice: None,
            words_per_minute: None,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// egui window appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Number of characters of the input text shown in the preview area.
    pub preview_chars: usize,
    /// Initial inner window size `(width, height)`.
    pub window_size: (f32, f32),
    /// Last saved window position.  `None` lets the window manager decide.
    pub window_position: Option<(f32, f32)>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            preview_chars: 1000,
            window_size: (720.0, 820.0),
            window_position: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use echoverse::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// assert!(config.generator.max_tokens > 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Text-generation backend.
    pub generator: GeneratorConfig,
    /// URL text extraction.
    pub fetch: FetchConfig,
    /// Speech synthesis engine.
    pub speech: SpeechConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
