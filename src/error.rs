//! Error types for page decomposition.
//!
//! Structural problems in the dump are reported as [`Error::MalformedInput`] and are never
//! recovered from silently; a skipped tag could hide corruption in the dump.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The sub-element structure does not match the dump grammar
    #[error("malformed input: {0}")]
    MalformedInput(#[from] Malformed),

    /// Tokenizer failure from the XML reader
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The revision sequence failed earlier and cannot make further progress
    #[error("revision sequence already failed: {cause}")]
    Poisoned { cause: String },
}

impl Error {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedInput(_))
    }
}

/// Ways the element structure of a page can violate the dump format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("unexpected tag found when processing {context}: '{tag}' (expected {expected})")]
    UnexpectedTag {
        tag: String,
        expected: &'static str,
        context: &'static str,
    },

    #[error("field '{field}' is not a valid integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("missing required field '{field}' in {context}")]
    MissingField {
        field: &'static str,
        context: &'static str,
    },

    #[error("unexpected end of input inside {context}")]
    UnexpectedEof { context: &'static str },
}
