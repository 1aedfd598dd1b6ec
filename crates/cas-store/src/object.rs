use cas_types::ContentAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored object: address, payload bytes, and the time it was first
/// persisted.
///
/// `StoredObject` is the unit of storage. It is created on the first
/// successful put of an address and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The address the payload was stored under.
    pub address: ContentAddress,
    /// The payload bytes exactly as written.
    pub payload: Vec<u8>,
    /// When the object was first persisted.
    pub created_at: DateTime<Utc>,
}

impl StoredObject {
    /// Create a new stored object stamped with the current time.
    pub fn new(address: ContentAddress, payload: Vec<u8>) -> Self {
        Self {
            address,
            payload,
            created_at: Utc::now(),
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Consume the object and return the payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// What a `put` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PutOutcome {
    /// The object was absent and is now persisted.
    Created,
    /// An object already existed under the address; nothing was written.
    AlreadyPresent,
}

impl PutOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Aggregate store statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of stored objects.
    pub objects: u64,
    /// Sum of payload sizes.
    pub total_bytes: u64,
}
