//! Core `Generator` trait and `ApiGenerator` implementation.
//!
//! `ApiGenerator` calls any OpenAI-compatible `/v1/completions` endpoint
//! (Ollama in OpenAI mode, vLLM, LM Studio, llama.cpp server, …) with a
//! plain text prompt and returns the continuation.  All connection and
//! sampling details come from [`GeneratorConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::GeneratorConfig;

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors that can occur during generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend could not be reached (connection refused, DNS, …).
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),

    /// The request did not complete within the configured timeout.
    #[error("generation request timed out")]
    Timeout,

    /// The backend answered with an error status.
    #[error("generation backend returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse generation response: {0}")]
    Parse(String),

    /// The model produced no continuation.
    #[error("model returned an empty continuation")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Unavailable(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Generator trait
// ---------------------------------------------------------------------------

/// Async trait for text generation.
///
/// One call produces one string; there is no batching and no streaming.
/// With sampling enabled the output differs between calls, so callers must
/// not rely on an exact value.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, text: &str) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// ApiGenerator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/completions` endpoint.
pub struct ApiGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl ApiGenerator {
    /// Build an `ApiGenerator` from application config.
    ///
    /// The client only gets a timeout when `config.timeout_secs` is set;
    /// otherwise a slow model blocks until it answers.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Request body for `text` under the fixed sampling configuration.
    fn request_body(&self, text: &str) -> serde_json::Value {
        let temperature = if self.config.do_sample {
            self.config.temperature
        } else {
            0.0
        };

        serde_json::json!({
            "model":       self.config.model,
            "prompt":      text,
            "max_tokens":  self.config.max_tokens,
            "temperature": temperature,
            "stream":      false
        })
    }
}

#[async_trait]
impl Generator for ApiGenerator {
    /// Send `text` as the prompt and return the generated text.
    ///
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string.
    async fn generate(&self, text: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut req = self.client.post(&url).json(&self.request_body(text));

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        log::debug!(
            "generate: POST {url} (model={}, prompt_len={})",
            self.config.model,
            text.len()
        );
        let response = req.send().await?;
        let status = response.status();

        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| GenerationError::Parse(e.to_string()))?;

        let continuation = parse_completion(&json)?;

        if self.config.return_full_text {
            Ok(format!("{text}{continuation}"))
        } else {
            Ok(continuation.trim().to_string())
        }
    }
}

/// Best-effort message from an error body: OpenAI-style `error.message`,
/// a bare `error` string, or the raw body.
fn error_message(body: &str) -> String {
    let json: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

/// Pull `choices[0].text` out of a completions response.
///
/// Fails with [`GenerationError::EmptyResponse`] when the continuation is
/// blank, so a successful call always adds something to the input.
pub fn parse_completion(json: &serde_json::Value) -> Result<String, GenerationError> {
    let text = json["choices"][0]["text"]
        .as_str()
        .ok_or_else(|| GenerationError::Parse("missing choices[0].text".into()))?;

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
