use cas_crypto::MalformedAddress;
use cas_types::ContentAddress;
use thiserror::Error;

/// Errors surfaced by the write and read paths.
///
/// Every variant is local to one call; none leaves shared state changed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Empty or oversized write payload.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The address string is not in canonical form.
    #[error(transparent)]
    MalformedAddress(#[from] MalformedAddress),

    /// Nothing is stored under the address.
    #[error("object not found: {0}")]
    NotFound(ContentAddress),

    /// The stored bytes do not hash back to their address.
    #[error("integrity violation for {address}: {reason}")]
    IntegrityViolation {
        address: ContentAddress,
        reason: String,
    },

    /// The backend failed to persist or load an object.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
