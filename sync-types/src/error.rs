//! Error types for itemsync value types.

use thiserror::Error;

/// Errors raised while parsing or validating itemsync values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Record identifier is not a valid UUID.
    #[error("invalid record id: {0}")]
    InvalidRecordId(String),

    /// Digest has the wrong length or is not valid hex.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}
