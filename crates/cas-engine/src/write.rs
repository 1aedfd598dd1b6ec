use std::sync::Arc;

use cas_crypto::AddressCodec;
use cas_store::ObjectStore;
use cas_types::ContentAddress;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Accepts raw payloads and commits them under their content address.
#[derive(Clone)]
pub struct WriteCoordinator {
    store: Arc<dyn ObjectStore>,
    codec: AddressCodec,
    max_payload_size: usize,
}

impl WriteCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            codec: config.codec(),
            max_payload_size: config.max_payload_size,
        }
    }

    /// Store `payload` and return its address.
    ///
    /// Writing a payload that is already stored returns the same address
    /// without touching the backend. A backend failure leaves no object
    /// behind.
    pub fn write(&self, payload: &[u8]) -> EngineResult<ContentAddress> {
        if payload.is_empty() {
            return Err(EngineError::InvalidPayload("payload is empty".into()));
        }
        if payload.len() > self.max_payload_size {
            return Err(EngineError::InvalidPayload(format!(
                "payload of {} bytes exceeds the {} byte limit",
                payload.len(),
                self.max_payload_size
            )));
        }

        let address = self.codec.derive(payload);
        if self.store.exists(&address) {
            debug!(address = %address.short_hex(), "write deduplicated");
            return Ok(address);
        }

        let outcome = self
            .store
            .put(&address, payload)
            .map_err(|e| EngineError::StorageFailure(e.to_string()))?;
        debug!(
            address = %address.short_hex(),
            size = payload.len(),
            created = outcome.is_created(),
            "write committed"
        );
        Ok(address)
    }

    pub fn codec(&self) -> AddressCodec {
        self.codec
    }
}

impl std::fmt::Debug for WriteCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteCoordinator")
            .field("backend", &self.store.backend())
            .field("codec", &self.codec)
            .field("max_payload_size", &self.max_payload_size)
            .finish()
    }
}
