//! Error types for tensor decomposition.

use std::io;

use crate::config::ConfigError;

// =============================================================================
// Parse errors
// =============================================================================

/// A malformed line in a coordinate stream.
///
/// `line` is 1-based, counting every physical line of the input
/// (comments and blank lines included).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// What was wrong with a line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected {expected} coordinates, found {found} tokens")]
    TooFewTokens { expected: usize, found: usize },

    #[error("invalid integer {token:?} on axis {axis}")]
    InvalidInteger { axis: usize, token: String },

    #[error("coordinate {value} on axis {axis} is below 1 in a one-based tensor")]
    NotOneBased { axis: usize, value: i64 },

    #[error("header declares {found} axes, expected {expected}")]
    HeaderMismatch { expected: usize, found: usize },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }

    /// Whether the line can be skipped under [`MalformedPolicy::Skip`].
    ///
    /// A header that disagrees with the configured dimension invalidates the
    /// whole file, so it is never skippable.
    ///
    /// [`MalformedPolicy::Skip`]: crate::config::MalformedPolicy::Skip
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind, ParseErrorKind::HeaderMismatch { .. })
    }
}

// =============================================================================
// AnalysisError
// =============================================================================

/// Errors that can abort a decomposition run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error at {0}")]
    Parse(#[from] ParseError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("record has {found} coordinates, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("coordinate buffer shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
