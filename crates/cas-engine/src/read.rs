use std::sync::Arc;

use cas_crypto::AddressCodec;
use cas_store::{ObjectStore, StoreError};
use cas_types::ContentAddress;
use tracing::{debug, error};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Fetches payloads by address and checks them against the address.
#[derive(Clone)]
pub struct ReadCoordinator {
    store: Arc<dyn ObjectStore>,
    codec: AddressCodec,
}

impl ReadCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            codec: config.codec(),
        }
    }

    /// Parse `address` and return the payload stored under it.
    ///
    /// A malformed address is rejected before the store is consulted.
    pub fn read(&self, address: &str) -> EngineResult<Vec<u8>> {
        let address = AddressCodec::decode(address)?;
        self.read_address(&address)
    }

    /// Return the payload stored under `address`, verified by rehashing.
    pub fn read_address(&self, address: &ContentAddress) -> EngineResult<Vec<u8>> {
        let object = self.store.get(address).map_err(|e| match e {
            StoreError::NotFound(a) => EngineError::NotFound(a),
            StoreError::Corrupt { address, reason } => {
                error!(address = %address, %reason, "stored record is corrupt");
                EngineError::IntegrityViolation { address, reason }
            }
            other => EngineError::StorageFailure(other.to_string()),
        })?;

        let computed = self.codec.derive(&object.payload);
        if computed != *address {
            error!(
                address = %address,
                computed = %computed,
                "stored payload does not hash to its address"
            );
            return Err(EngineError::IntegrityViolation {
                address: *address,
                reason: format!("payload hashes to {computed}"),
            });
        }

        debug!(address = %address.short_hex(), size = object.payload.len(), "read verified");
        Ok(object.into_payload())
    }
}

impl std::fmt::Debug for ReadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadCoordinator")
            .field("backend", &self.store.backend())
            .field("codec", &self.codec)
            .finish()
    }
}
