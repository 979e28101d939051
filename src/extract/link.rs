//! URL text extraction.
//!
//! [`LinkFetcher`] issues a single HTTP GET and hands back the body exactly
//! as served: HTML stays HTML.  No custom headers, no retries, and no
//! timeout unless one is configured in [`FetchConfig`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use thiserror::Error;

use crate::config::FetchConfig;

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

/// Errors that can occur while fetching a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The input could not be parsed as an http(s) URL.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection, DNS or transport failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The configured timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("server answered with HTTP {0}")]
    Status(u16),

    /// The response body is not text.
    #[error("response is not text ({0})")]
    NonText(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// LinkSource trait
// ---------------------------------------------------------------------------

/// Async URL → text source.
#[async_trait]
pub trait LinkSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// ---------------------------------------------------------------------------
// LinkFetcher
// ---------------------------------------------------------------------------

/// `reqwest`-backed [`LinkSource`].
pub struct LinkFetcher {
    client: reqwest::Client,
}

impl LinkFetcher {
    /// Build a fetcher from config.  Without `timeout_secs` the client waits
    /// indefinitely.
    pub fn from_config(config: &FetchConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }
}

#[async_trait]
impl LinkSource for LinkFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = parse_url(url)?;

        log::debug!("link: GET {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        match content_type {
            // Declared text: let reqwest honour the charset parameter.
            Some(ct) if is_textual(&ct) => Ok(response.text().await?),
            Some(ct) => Err(FetchError::NonText(ct)),
            // Undeclared: accept only valid UTF-8.
            None => {
                let bytes = response.bytes().await?;
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| FetchError::NonText("undeclared binary body".into()))
            }
        }
    }
}

/// Parse and validate an http(s) URL, ignoring surrounding whitespace.
fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| FetchError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

/// `true` for media types whose body is meaningful as text.
pub fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.starts_with("text/")
        || mime.ends_with("+xml")
        || mime.ends_with("+json")
        || matches!(
            mime.as_str(),
            "application/json"
                | "application/xml"
                | "application/javascript"
                | "application/ecmascript"
        )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    fn fetcher() -> LinkFetcher {
        LinkFetcher::from_config(&FetchConfig::default())
    }

    #[test]
    fn textual_media_types() {
        assert!(is_textual("text/html; charset=utf-8"));
        assert!(is_textual("text/plain"));
        assert!(is_textual("Application/JSON"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(is_textual("application/ld+json"));
        assert!(!is_textual("image/png"));
        assert!(!is_textual("application/pdf"));
        assert!(!is_textual("application/octet-stream"));
    }

    #[tokio::test]
    async fn rejects_malformed_url() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let err = fetcher().fetch("ftp://example.com/file.txt").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        // Port 1 on loopback is never listening in the test environment.
        let err = fetcher().fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn returns_markup_verbatim() {
        let body = "<html><body><p>Photosynthesis</p></body></html>";
        let addr = serve_once(
            "200 OK",
            &[("Content-Type", "text/html; charset=utf-8")],
            body.as_bytes(),
        )
        .await;

        let text = fetcher().fetch(&format!("  http://{addr}/page  ")).await.unwrap();
        assert_eq!(text, body);
    }

    #[tokio::test]
    async fn binary_content_type_is_rejected() {
        let png: [u8; 3] = [0x89, 0x50, 0x4e];
        let addr = serve_once("200 OK", &[("Content-Type", "image/png")], &png).await;

        let err = fetcher().fetch(&format!("http://{addr}/logo.png")).await.unwrap_err();
        assert!(matches!(err, FetchError::NonText(ref ct) if ct == "image/png"));
    }

    #[tokio::test]
    async fn undeclared_utf8_body_is_accepted() {
        let addr = serve_once("200 OK", &[], b"plain words").await;

        let text = fetcher().fetch(&format!("http://{addr}/")).await.unwrap();
        assert_eq!(text, "plain words");
    }

    #[tokio::test]
    async fn undeclared_binary_body_is_rejected() {
        let addr = serve_once("200 OK", &[], &[0xff, 0xfe, 0x00, 0xc3]).await;

        let err = fetcher().fetch(&format!("http://{addr}/")).await.unwrap_err();
        assert!(matches!(err, FetchError::NonText(_)));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let addr = serve_once("404 Not Found", &[("Content-Type", "text/html")], b"missing").await;

        let err = fetcher().fetch(&format!("http://{addr}/gone")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
    }
}
