use cas_types::ContentAddress;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{PutOutcome, StoreStats, StoredObject};
use crate::traits::ObjectStore;

/// In-memory object store.
///
/// Objects live in a sharded [`DashMap`], so a put only locks the shard that
/// owns its address. Intended for tests, embedding, and nodes started
/// without a data directory. Nothing survives a restart.
pub struct InMemoryObjectStore {
    objects: DashMap<ContentAddress, StoredObject>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Total payload bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects.iter().map(|obj| obj.size()).sum()
    }

    /// Return a sorted list of all addresses in the store.
    pub fn all_addresses(&self) -> Vec<ContentAddress> {
        let mut addrs: Vec<ContentAddress> = self.objects.iter().map(|e| *e.key()).collect();
        addrs.sort();
        addrs
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, address: &ContentAddress, payload: &[u8]) -> StoreResult<PutOutcome> {
        // The entry guard holds the shard lock, making check-then-insert atomic.
        match self.objects.entry(*address) {
            Entry::Occupied(_) => Ok(PutOutcome::AlreadyPresent),
            Entry::Vacant(slot) => {
                slot.insert(StoredObject::new(*address, payload.to_vec()));
                debug!(address = %address.short_hex(), size = payload.len(), "memory put");
                Ok(PutOutcome::Created)
            }
        }
    }

    fn get(&self, address: &ContentAddress) -> StoreResult<StoredObject> {
        self.objects
            .get(address)
            .map(|obj| obj.value().clone())
            .ok_or(StoreError::NotFound(*address))
    }

    fn exists(&self, address: &ContentAddress) -> bool {
        self.objects.contains_key(address)
    }

    fn stats(&self) -> StoreResult<StoreStats> {
        Ok(StoreStats {
            objects: self.len() as u64,
            total_bytes: self.total_bytes(),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
