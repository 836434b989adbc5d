//! Error types for grid dump parsing.

use std::path::PathBuf;

use merra_common::{Quantity, ShapeError};
use thiserror::Error;

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised while detecting or decoding a grid dump.
///
/// Line numbers are 1-based.
#[derive(Error, Debug)]
pub enum ParseError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input bytes are not UTF-8 text
    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Not enough lines to hold the header or axis rows
    #[error("input too short: expected at least {expected} lines, found {actual}")]
    TooShort { expected: usize, actual: usize },

    /// A field that should be numeric is not
    #[error("line {line}: invalid number '{token}' in {context}")]
    InvalidNumber {
        line: usize,
        token: String,
        context: String,
    },

    /// A line does not have the structure of the detected format
    #[error("line {line}: expected {expected}, found '{found}'")]
    Malformed {
        line: usize,
        expected: String,
        found: String,
    },

    /// A tagged coordinate has no exact entry in the header axis table
    #[error("line {line}: {quantity} tag {tag}={value} does not match any value of the {tag} axis")]
    UnknownTag {
        line: usize,
        quantity: Quantity,
        tag: &'static str,
        value: String,
    },

    /// A data row does not fit the grid declared by the axes
    #[error("line {line}: {quantity} {source}")]
    Shape {
        line: usize,
        quantity: Quantity,
        #[source]
        source: ShapeError,
    },

    /// Rows that were never written, when incomplete grids are rejected
    #[error("{missing} of {total} grid rows were never written")]
    Incomplete { missing: usize, total: usize },

    /// Any of the above, attributed to a file
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Create a Malformed error, truncating long lines.
    pub fn malformed(line: usize, expected: impl Into<String>, found: &str) -> Self {
        Self::Malformed {
            line,
            expected: expected.into(),
            found: excerpt(found),
        }
    }

    /// Create an InvalidNumber error.
    pub fn invalid_number(line: usize, token: &str, context: impl Into<String>) -> Self {
        Self::InvalidNumber {
            line,
            token: excerpt(token),
            context: context.into(),
        }
    }

    /// Attach a file path to this error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ Self::File { .. } => already,
            other => Self::File {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// 1-based line number, if the error is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidNumber { line, .. }
            | Self::Malformed { line, .. }
            | Self::UnknownTag { line, .. }
            | Self::Shape { line, .. } => Some(*line),
            Self::File { source, .. } => source.line(),
            _ => None,
        }
    }
}

const EXCERPT_LEN: usize = 80;

fn excerpt(text: &str) -> String {
    let trimmed = text.trim_end();
    match trimmed.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
