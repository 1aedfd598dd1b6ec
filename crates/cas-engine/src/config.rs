use cas_crypto::{AddressCodec, HashAlgorithm};
use serde::{Deserialize, Serialize};

/// Largest accepted write payload unless configured otherwise (16 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Settings shared by the write and read coordinators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Digest used to derive addresses.
    pub hash_algorithm: HashAlgorithm,
    /// Upper bound on write payload size in bytes.
    pub max_payload_size: usize,
}

impl EngineConfig {
    pub fn codec(&self) -> AddressCodec {
        AddressCodec::new(self.hash_algorithm)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::default(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}
