use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("missing `0x` prefix")]
    MissingPrefix,

    #[error("invalid encoded length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex character {found:?} at position {position}")]
    InvalidCharacter { position: usize, found: char },
}
