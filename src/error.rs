//! Error types for history replay and diff merging.

use crate::types::DocumentId;
use thiserror::Error;

/// Why a single operation could not be applied to a document state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("Version mismatch: document is at {expected}, operation targets {found}")]
    VersionMismatch { expected: u64, found: u64 },

    #[error("Malformed operation: {0}")]
    MalformedOperation(String),
}

/// Coarse reason behind an [`ApplyError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyErrorKind {
    VersionMismatch,
    MalformedOperation,
}

impl ApplyError {
    pub fn kind(&self) -> ApplyErrorKind {
        match self {
            ApplyError::VersionMismatch { .. } => ApplyErrorKind::VersionMismatch,
            ApplyError::MalformedOperation(_) => ApplyErrorKind::MalformedOperation,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ApplyError::MalformedOperation(reason.into())
    }
}

/// A chunk diff span could not be located in the baseline it claims to edit.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Merge alignment error in chunk {chunk} at byte {offset}: {reason}")]
pub struct MergeAlignmentError {
    /// Index of the chunk diff that failed to align.
    pub chunk: usize,
    /// Byte offset into that chunk's baseline.
    pub offset: usize,
    pub reason: String,
}

impl MergeAlignmentError {
    pub(crate) fn new(chunk: usize, offset: usize, reason: impl Into<String>) -> Self {
        Self {
            chunk,
            offset,
            reason: reason.into(),
        }
    }
}

/// Main error type for history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Operation log is empty")]
    EmptyLog,

    #[error("Failed to apply operation {index} (ts {timestamp}): {source}")]
    Apply {
        index: usize,
        timestamp: i64,
        #[source]
        source: ApplyError,
    },

    #[error(transparent)]
    MergeAlignment(#[from] MergeAlignmentError),

    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl HistoryError {
    /// The underlying apply failure, if this error aborted a replay.
    pub fn apply_error(&self) -> Option<&ApplyError> {
        match self {
            HistoryError::Apply { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(e: serde_json::Error) -> Self {
        HistoryError::Serialization(e.to_string())
    }
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
