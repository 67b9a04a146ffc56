//! Error types for ASCII payload parsing.

use coastal_common::CoastalError;
use thiserror::Error;

/// Maximum number of characters of offending text kept for diagnosis.
pub const EXCERPT_LIMIT: usize = 200;

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Error types for ASCII payload parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Required variable header not present in the document
    #[error("variable '{variable}' not found (near: {excerpt:?})")]
    ExtractionFailure { variable: String, excerpt: String },

    /// Variable present but its axis has no values
    #[error("axis '{variable}' is empty (near: {excerpt:?})")]
    EmptyAxis { variable: String, excerpt: String },

    /// No tolerated layout matches the observed value count
    #[error(
        "cannot shape {observed} values of '{variable}' into {rows}x{cols} (expected {expected}; near: {excerpt:?})"
    )]
    ShapeMismatch {
        variable: String,
        observed: usize,
        rows: usize,
        cols: usize,
        expected: usize,
        excerpt: String,
    },

    /// Parallel arrays of unequal length
    #[error("{dataset}: parallel arrays differ in length ({})", describe_lengths(.lengths))]
    ArrayLengthMismatch {
        dataset: String,
        lengths: Vec<(String, usize)>,
    },

    /// Exported table cannot be read back
    #[error("invalid profile table: {0}")]
    InvalidTable(String),
}

fn describe_lengths(lengths: &[(String, usize)]) -> String {
    lengths
        .iter()
        .map(|(name, len)| format!("{}={}", name, len))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ParseError {
    pub fn extraction_failure(variable: impl Into<String>, text: &str) -> Self {
        Self::ExtractionFailure {
            variable: variable.into(),
            excerpt: excerpt(text),
        }
    }

    pub fn empty_axis(variable: impl Into<String>, text: &str) -> Self {
        Self::EmptyAxis {
            variable: variable.into(),
            excerpt: excerpt(text),
        }
    }

    /// Name of the variable or dataset the error is about.
    pub fn subject(&self) -> &str {
        match self {
            ParseError::ExtractionFailure { variable, .. }
            | ParseError::EmptyAxis { variable, .. }
            | ParseError::ShapeMismatch { variable, .. } => variable,
            ParseError::ArrayLengthMismatch { dataset, .. } => dataset,
            ParseError::InvalidTable(_) => "profile table",
        }
    }
}

impl From<ParseError> for CoastalError {
    fn from(err: ParseError) -> Self {
        CoastalError::parse(err.subject().to_string(), err.to_string())
    }
}

/// Leading slice of `text` bounded to [`EXCERPT_LIMIT`] characters.
pub fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
