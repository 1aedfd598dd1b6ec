//! JSON-RPC error kinds and their wire codes.

use std::fmt;

use cas_engine::EngineError;
use serde::{Deserialize, Serialize};

/// Wire codes, one per [`ErrorKind`].
pub mod codes {
    // JSON-RPC 2.0 standard errors
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const INVALID_PARAMS: i32 = -32602;

    // Server errors (-32000 to -32099)
    pub const NOT_FOUND: i32 = -32001;
    pub const MALFORMED_ADDRESS: i32 = -32002;
    pub const INTEGRITY_VIOLATION: i32 = -32003;
    pub const STORAGE_FAILURE: i32 = -32004;
}

/// Every way a call can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The body is not JSON.
    ParseError,
    /// The envelope is not a well-formed `local` read/write call.
    InvalidRequest,
    /// Empty or oversized write payload.
    InvalidPayload,
    /// Nothing stored under the address.
    NotFound,
    /// Address text is not `0x` + 64 lowercase hex digits.
    MalformedAddress,
    /// Stored bytes failed verification.
    IntegrityViolation,
    /// Backend I/O failed or the call timed out.
    StorageFailure,
}

impl ErrorKind {
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => codes::PARSE_ERROR,
            Self::InvalidRequest => codes::INVALID_REQUEST,
            Self::InvalidPayload => codes::INVALID_PARAMS,
            Self::NotFound => codes::NOT_FOUND,
            Self::MalformedAddress => codes::MALFORMED_ADDRESS,
            Self::IntegrityViolation => codes::INTEGRITY_VIOLATION,
            Self::StorageFailure => codes::STORAGE_FAILURE,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        let kind = match code {
            codes::PARSE_ERROR => Self::ParseError,
            codes::INVALID_REQUEST => Self::InvalidRequest,
            codes::INVALID_PARAMS => Self::InvalidPayload,
            codes::NOT_FOUND => Self::NotFound,
            codes::MALFORMED_ADDRESS => Self::MalformedAddress,
            codes::INTEGRITY_VIOLATION => Self::IntegrityViolation,
            codes::STORAGE_FAILURE => Self::StorageFailure,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether a caller may reasonably send the same call again later.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NotFound | Self::StorageFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ParseError => "parse error",
            Self::InvalidRequest => "invalid request",
            Self::InvalidPayload => "invalid payload",
            Self::NotFound => "not found",
            Self::MalformedAddress => "malformed address",
            Self::IntegrityViolation => "integrity violation",
            Self::StorageFailure => "storage failure",
        };
        f.write_str(name)
    }
}

/// A failed call: kind plus a human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RpcError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RpcError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn parse_error(details: impl fmt::Display) -> Self {
        Self::new(ErrorKind::ParseError, format!("Parse error: {details}"))
    }

    pub fn invalid_request(details: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::InvalidRequest,
            format!("Invalid request: {details}"),
        )
    }

    /// The call did not finish within the configured deadline.
    pub fn timeout(after_ms: u64) -> Self {
        Self::new(
            ErrorKind::StorageFailure,
            format!("Storage failure: request timed out after {after_ms} ms"),
        )
    }

    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    /// The `{code, message}` object placed in a response.
    pub fn to_object(&self) -> RpcErrorObject {
        RpcErrorObject {
            code: self.code(),
            message: self.message.clone(),
        }
    }
}

impl From<EngineError> for RpcError {
    fn from(e: EngineError) -> Self {
        let kind = match &e {
            EngineError::InvalidPayload(_) => ErrorKind::InvalidPayload,
            EngineError::MalformedAddress(_) => ErrorKind::MalformedAddress,
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::IntegrityViolation { .. } => ErrorKind::IntegrityViolation,
            EngineError::StorageFailure(_) => ErrorKind::StorageFailure,
        };
        Self::new(kind, capitalize(&e.to_string()))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Wire form of an error: `{ "code": <int>, "message": <string> }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
}

impl RpcErrorObject {
    /// The kind this code belongs to, if it is one of ours.
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(self.code)
    }
}
