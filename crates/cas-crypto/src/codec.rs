use std::fmt;

use cas_types::{ContentAddress, TypeError};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

/// Digest used to derive content addresses.
///
/// Both produce 256-bit digests. A node uses one algorithm for its whole
/// lifetime; switching algorithms on an existing data directory makes every
/// stored object fail its integrity check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha3-256")]
    Sha3_256,
    #[serde(rename = "blake3")]
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha3_256 => write!(f, "sha3-256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// An address string that is not `0x` followed by 64 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed address {input:?}: {reason}")]
pub struct MalformedAddress {
    pub input: String,
    pub reason: TypeError,
}

/// Deterministic mapping between payload bytes and content addresses.
///
/// `AddressCodec` is `Copy` and holds no state beyond the algorithm choice,
/// so every coordinator can carry its own copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddressCodec {
    algorithm: HashAlgorithm,
}

impl AddressCodec {
    /// Codec using SHA3-256.
    pub const SHA3_256: Self = Self::new(HashAlgorithm::Sha3_256);
    /// Codec using BLAKE3.
    pub const BLAKE3: Self = Self::new(HashAlgorithm::Blake3);

    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The digest this codec derives addresses with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Derive the content address of a payload.
    pub fn derive(&self, payload: &[u8]) -> ContentAddress {
        let mut digest = [0u8; 32];
        match self.algorithm {
            HashAlgorithm::Sha3_256 => digest.copy_from_slice(&Sha3_256::digest(payload)),
            HashAlgorithm::Blake3 => digest = *blake3::hash(payload).as_bytes(),
        }
        ContentAddress::from_digest(digest)
    }

    /// Rehash `payload` and compare against `expected`.
    pub fn verify(&self, payload: &[u8], expected: &ContentAddress) -> bool {
        self.derive(payload) == *expected
    }

    /// Canonical text form of an address.
    pub fn encode(addr: &ContentAddress) -> String {
        addr.encode()
    }

    /// Parse the canonical text form.
    pub fn decode(input: &str) -> Result<ContentAddress, MalformedAddress> {
        ContentAddress::parse(input).map_err(|reason| MalformedAddress {
            input: truncate_for_error(input),
            reason,
        })
    }
}

/// Keep error messages bounded when a client sends a huge bogus address.
fn truncate_for_error(input: &str) -> String {
    const MAX: usize = 80;
    match input.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &input[..end]),
        None => input.to_string(),
    }
}
