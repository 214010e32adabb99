//! Error types for TSW alignment requests

use thiserror::Error;

/// Errors that can abort an alignment request
///
/// None of these are retried: the computation is deterministic, so the same
/// inputs reproduce the same failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TswError {
    #[error("No similarity entry for label '{label}'")]
    MissingSimilarityEntry { label: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid score input: {0}")]
    InvalidScoreInput(String),

    #[error("Invalid similarity table: {0}")]
    InvalidSimilarityTable(String),

    /// A trace code outside `0..=3` was found during traceback.
    /// This means the trace matrix was not produced by the score builder.
    #[error("Corrupt trace state: code {code} at cell (row {row}, col {col})")]
    CorruptTraceState { code: u8, row: usize, col: usize },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl TswError {
    pub fn missing_label<S: Into<String>>(label: S) -> Self {
        Self::MissingSimilarityEntry { label: label.into() }
    }

    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn invalid_score<S: Into<String>>(message: S) -> Self {
        Self::InvalidScoreInput(message.into())
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedRecord(message.into())
    }

    /// Whether the error comes from a defect inside the engine rather than
    /// from caller-supplied input
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::CorruptTraceState { .. })
    }
}

pub type TswResult<T> = Result<T, TswError>;
