//! Text extraction: the two ways of obtaining input text besides typing.
//!
//! * [`pdf`]: uploaded PDF document → concatenated page text.
//! * [`link`]: URL → raw response body.
//!
//! The two paths share no logic; each has its own error type so the UI can
//! tell a broken document from a broken network.

pub mod link;
pub mod pdf;

pub use link::{is_textual, FetchError, LinkFetcher, LinkSource};
pub use pdf::{concat_pages, DocumentExtractor, DocumentSource, ParseError, PdfExtractor};
