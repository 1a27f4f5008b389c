//! Error types for the plaintext library.

use std::io;
use thiserror::Error;

/// Result type alias for plaintext operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while transcoding documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The image side-table could not be read or written.
    #[error("Image table error: {0}")]
    Json(#[from] serde_json::Error),

    /// A percent-encoded payload could not be decoded.
    #[error("Decoding error: {0}")]
    Decode(String),

    /// A table or figure specification is structurally invalid.
    #[error("Malformed {kind} grid: {message}")]
    MalformedGrid {
        /// "table" or "figure"
        kind: &'static str,
        /// What went wrong
        message: String,
    },

    /// A text run was given more than one mark.
    #[error("Conflicting marks on one run: {0} and {1}")]
    MarkConflict(String, String),

    /// Error during rendering (LaTeX, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a table grid error.
    pub fn table(message: impl Into<String>) -> Self {
        Error::MalformedGrid {
            kind: "table",
            message: message.into(),
        }
    }

    /// Create a figure grid error.
    pub fn figure(message: impl Into<String>) -> Self {
        Error::MalformedGrid {
            kind: "figure",
            message: message.into(),
        }
    }
}

/// What kind of problem a [`Diagnostic`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An image directive names an id missing from the side-table
    StaleImage,
    /// A percent-encoded payload failed to decode
    Decode,
    /// A cross reference names no known label
    UnresolvedReference,
}

/// A recoverable problem found while transcoding.
///
/// Lenient parsing and emission skip the offending directive and record
/// one of these instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    /// 1-based line of flat text the problem was found on
    pub line: usize,
    /// Problem category
    pub kind: DiagnosticKind,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(line: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
