//! PDF text extraction on top of `lopdf`.
//!
//! [`PdfExtractor`] turns an uploaded document into the plain text that is
//! handed to the generator.  Pages are visited in page-number order and each
//! page's text is followed by a single newline.
//!
//! # Empty and failing pages
//!
//! * A page with no extractable text contributes an empty line, so page
//!   boundaries stay visible in the output.
//! * If *no* page yields any text (typically a scanned, image-only PDF) the
//!   call fails with [`ParseError::NoText`].
//! * If extracting any single page fails the whole call fails with
//!   [`ParseError::Page`]; partial text is never returned.

use std::path::PathBuf;

use lopdf::Document;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// Errors produced while reading an uploaded document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document file could not be read from disk.
    #[error("cannot read document: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are not a valid PDF document.
    #[error("not a valid PDF document: {0}")]
    Invalid(String),

    /// The document is password protected.
    #[error("document is encrypted")]
    Encrypted,

    /// The document parsed but contains no pages.
    #[error("document has no pages")]
    NoPages,

    /// Text extraction failed on one page.
    #[error("failed to extract text from page {page}: {reason}")]
    Page { page: u32, reason: String },

    /// Every page came back empty (e.g. a scanned image PDF).
    #[error("document contains no extractable text")]
    NoText,
}

// ---------------------------------------------------------------------------
// DocumentSource
// ---------------------------------------------------------------------------

/// Where an uploaded document comes from.
///
/// Native file drops and the path field produce [`DocumentSource::Path`];
/// drops that only carry contents produce [`DocumentSource::Bytes`].
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Vec<u8> },
}

impl DocumentSource {
    /// Short name used in log lines and the UI.
    pub fn name(&self) -> String {
        match self {
            DocumentSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            DocumentSource::Bytes { name, .. } => name.clone(),
        }
    }

    /// Resolve the document contents, reading from disk if needed.
    pub fn into_bytes(self) -> Result<Vec<u8>, ParseError> {
        match self {
            DocumentSource::Path(path) => Ok(std::fs::read(path)?),
            DocumentSource::Bytes { bytes, .. } => Ok(bytes),
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentExtractor trait
// ---------------------------------------------------------------------------

/// Blocking document → text extraction.
///
/// Implementations must be `Send + Sync` so the session worker can run them
/// on the blocking thread pool behind an `Arc<dyn DocumentExtractor>`.
pub trait DocumentExtractor: Send + Sync {
    /// Extract the full text of the document in `bytes`.
    fn extract(&self, bytes: &[u8]) -> Result<String, ParseError>;
}

// ---------------------------------------------------------------------------
// PdfExtractor
// ---------------------------------------------------------------------------

/// Production extractor backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ParseError> {
        // lopdf may try an empty-password decrypt while loading, so a locked
        // document can fail either here or at the check below.
        let doc = match Document::load_mem(bytes) {
            Ok(doc) => doc,
            Err(_) if declares_encryption(bytes) => return Err(ParseError::Encrypted),
            Err(e) => return Err(ParseError::Invalid(e.to_string())),
        };

        if doc.is_encrypted() {
            return Err(ParseError::Encrypted);
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(ParseError::NoPages);
        }

        log::debug!("pdf: extracting text from {} page(s)", pages.len());

        // `get_pages` is a BTreeMap keyed by page number, so iteration is in
        // page order.
        concat_pages(pages.keys().map(|&page| {
            doc.extract_text(&[page])
                .map_err(|e| ParseError::Page {
                    page,
                    reason: e.to_string(),
                })
        }))
    }
}

/// `true` when the raw file carries an `/Encrypt` entry.
fn declares_encryption(bytes: &[u8]) -> bool {
    const KEY: &[u8] = b"/Encrypt";
    bytes.windows(KEY.len()).any(|w| w == KEY)
}

/// Join per-page text in order, one trailing newline per page.
///
/// Stops at the first page error.  Fails with [`ParseError::NoText`] when
/// the joined result holds nothing but whitespace.
pub fn concat_pages<I>(pages: I) -> Result<String, ParseError>
where
    I: IntoIterator<Item = Result<String, ParseError>>,
{
    let mut text = String::new();
    for page in pages {
        let page = page?;
        text.push_str(page.trim_end_matches(['\r', '\n']));
        text.push('\n');
    }

    if text.trim().is_empty() {
        return Err(ParseError::NoText);
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_encrypted_pdf, build_pdf};

    #[test]
    fn concat_keeps_page_order() {
        let text = concat_pages(vec![Ok("first".to_string()), Ok("second".to_string())]).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }

    #[test]
    fn concat_normalises_trailing_newlines() {
        let text =
            concat_pages(vec![Ok("one\n".to_string()), Ok("two\r\n".to_string())]).unwrap();
        assert_eq!(text, "one\ntwo\n");
    }

    #[test]
    fn empty_page_contributes_an_empty_line() {
        let text = concat_pages(vec![
            Ok("intro".to_string()),
            Ok(String::new()),
            Ok("outro".to_string()),
        ])
        .unwrap();
        assert_eq!(text, "intro\n\noutro\n");
    }

    #[test]
    fn all_empty_pages_fail_with_no_text() {
        let result = concat_pages(vec![Ok(String::new()), Ok("  \n".to_string())]);
        assert!(matches!(result, Err(ParseError::NoText)));
    }

    #[test]
    fn page_error_fails_the_whole_call() {
        let result = concat_pages(vec![
            Ok("fine".to_string()),
            Err(ParseError::Page {
                page: 2,
                reason: "broken stream".into(),
            }),
            Ok("never reached".to_string()),
        ]);
        assert!(matches!(result, Err(ParseError::Page { page: 2, .. })));
    }

    #[test]
    fn garbage_bytes_are_invalid() {
        let result = PdfExtractor::new().extract(b"this is not a pdf");
        assert!(matches!(result, Err(ParseError::Invalid(_))));
    }

    #[test]
    fn extracts_pages_in_order() {
        let bytes = build_pdf(&[Some("Alpha page"), Some("Beta page")]);
        let text = PdfExtractor::new().extract(&bytes).unwrap();

        let alpha = text.find("Alpha").expect("first page text");
        let beta = text.find("Beta").expect("second page text");
        assert!(alpha < beta, "page order lost: {text:?}");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn locked_document_is_reported_as_encrypted() {
        let bytes = build_encrypted_pdf(&[Some("Secret notes")]);
        let result = PdfExtractor::new().extract(&bytes);
        assert!(matches!(result, Err(ParseError::Encrypted)), "got {result:?}");
    }

    #[test]
    fn encrypt_marker_detection() {
        assert!(declares_encryption(b"trailer << /Encrypt 7 0 R >>"));
        assert!(!declares_encryption(b"%PDF-1.5 plain body"));
    }

    #[test]
    fn image_only_document_has_no_text() {
        let bytes = build_pdf(&[None, None]);
        let result = PdfExtractor::new().extract(&bytes);
        assert!(matches!(result, Err(ParseError::NoText)));
    }

    #[test]
    fn blank_page_between_text_pages_is_kept() {
        let bytes = build_pdf(&[Some("Cover"), None, Some("Body")]);
        let text = PdfExtractor::new().extract(&bytes).unwrap();
        assert!(text.contains("\n\n"), "blank page collapsed: {text:?}");
    }

    #[test]
    fn source_reads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"%PDF-1.5").expect("write");

        let source = DocumentSource::Path(path);
        assert_eq!(source.name(), "notes.pdf");
        assert_eq!(source.into_bytes().unwrap(), b"%PDF-1.5");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let source = DocumentSource::Path(PathBuf::from("/definitely/not/here.pdf"));
        assert!(matches!(source.into_bytes(), Err(ParseError::Io(_))));
    }
}
