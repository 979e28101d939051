//! EchoVerse: a small learning assistant that turns a PDF, a web page or
//! typed text into a plain-language explanation and can read it aloud.
//!
//! ```text
//! PDF / Link / Text ─▶ extract ─▶ Session.raw_text
//!                                    │ Explain
//!                                    ▼
//!                      generate ─▶ Session.explanation
//!                                    │ Speak
//!                                    ▼
//!                      speech ─▶ AudioClip ─▶ audio (speaker)
//! ```

pub mod app;
pub mod audio;
pub mod config;
pub mod extract;
pub mod generate;
pub mod session;
pub mod speech;

#[cfg(test)]
mod test_support;
