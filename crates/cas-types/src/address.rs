use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Number of raw digest bytes in an address.
pub const ADDRESS_LEN: usize = 32;

/// Prefix of the external text form.
pub const ADDRESS_PREFIX: &str = "0x";

/// Length of the external text form: prefix plus two hex digits per byte.
pub const ENCODED_LEN: usize = ADDRESS_PREFIX.len() + ADDRESS_LEN * 2;

/// Content-addressed identifier for a stored payload.
///
/// A `ContentAddress` is the 256-bit digest of a payload's bytes. Identical
/// payloads always produce the same address. The external form is always
/// `0x` followed by 64 lowercase hex characters; [`ContentAddress::parse`]
/// accepts only that canonical form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentAddress([u8; ADDRESS_LEN]);

impl ContentAddress {
    /// Wrap a pre-computed digest.
    pub const fn from_digest(digest: [u8; ADDRESS_LEN]) -> Self {
        Self(digest)
    }

    /// The all-zero address. No payload hashes to it in practice.
    pub const fn zero() -> Self {
        Self([0u8; ADDRESS_LEN])
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Canonical external form: `0x` + 64 lowercase hex characters.
    pub fn encode(&self) -> String {
        let mut s = String::with_capacity(ENCODED_LEN);
        s.push_str(ADDRESS_PREFIX);
        s.push_str(&hex::encode(self.0));
        s
    }

    /// Hex digits without the prefix (used for on-disk file names).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four bytes as hex, for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse the canonical external form.
    ///
    /// Rejects a missing prefix, any length other than 66 characters, and any
    /// character outside `[0-9a-f]`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let digits = s
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or(TypeError::MissingPrefix)?;
        if s.len() != ENCODED_LEN {
            return Err(TypeError::InvalidLength {
                expected: ENCODED_LEN,
                actual: s.len(),
            });
        }
        if let Some((i, c)) = digits
            .char_indices()
            .find(|(_, c)| !matches!(c, '0'..='9' | 'a'..='f'))
        {
            return Err(TypeError::InvalidCharacter {
                position: ADDRESS_PREFIX.len() + i,
                found: c,
            });
        }
        let mut digest = [0u8; ADDRESS_LEN];
        // Charset and length were checked above, so this cannot fail.
        hex::decode_to_slice(digits, &mut digest).map_err(|_| TypeError::InvalidLength {
            expected: ENCODED_LEN,
            actual: s.len(),
        })?;
        Ok(Self(digest))
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress(0x{})", self.short_hex())
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ContentAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; ADDRESS_LEN]> for ContentAddress {
    fn from(digest: [u8; ADDRESS_LEN]) -> Self {
        Self(digest)
    }
}

impl From<ContentAddress> for [u8; ADDRESS_LEN] {
    fn from(addr: ContentAddress) -> Self {
        addr.0
    }
}

impl Serialize for ContentAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for ContentAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
