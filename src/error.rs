//! Error types for publication setup and navigator construction.
//!
//! Runtime navigation never fails loudly: out-of-range indices, unknown
//! hrefs, malformed bridge payloads and failed script evaluations are dropped
//! and the last good state stays in place. Only caller contract breaches at
//! construction time surface as errors.

use core::fmt;

/// Errors raised while building a publication or navigator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigatorError {
    /// The publication has no spine items.
    EmptySpine,
    /// The requested initial index is outside the spine.
    InitialIndexOutOfRange { index: usize, count: usize },
    /// The publication base URL is not an absolute `scheme://host` URL.
    InvalidBaseUrl(String),
    /// Table of contents parsing failed.
    Toc(String),
}

impl fmt::Display for NavigatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigatorError::EmptySpine => write!(f, "publication spine is empty"),
            NavigatorError::InitialIndexOutOfRange { index, count } => write!(
                f,
                "initial index {} is out of range for {} spine items",
                index, count
            ),
            NavigatorError::InvalidBaseUrl(url) => write!(f, "invalid base URL: {}", url),
            NavigatorError::Toc(msg) => write!(f, "table of contents error: {}", msg),
        }
    }
}

impl std::error::Error for NavigatorError {}
