//! Store doubles for exercising failure paths.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use cas_store::{
    InMemoryObjectStore, ObjectStore, PutOutcome, StoreError, StoreResult, StoreStats,
    StoredObject,
};
use cas_types::ContentAddress;

/// Wraps an in-memory store and counts calls.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: InMemoryObjectStore,
    puts: AtomicUsize,
    gets: AtomicUsize,
}

impl RecordingStore {
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl ObjectStore for RecordingStore {
    fn put(&self, address: &ContentAddress, payload: &[u8]) -> StoreResult<PutOutcome> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(address, payload)
    }

    fn get(&self, address: &ContentAddress) -> StoreResult<StoredObject> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(address)
    }

    fn exists(&self, address: &ContentAddress) -> bool {
        self.inner.exists(address)
    }

    fn stats(&self) -> StoreResult<StoreStats> {
        self.inner.stats()
    }

    fn backend(&self) -> &'static str {
        "recording"
    }
}

/// Returns every payload with its first byte flipped.
#[derive(Default)]
pub struct TamperingStore {
    inner: InMemoryObjectStore,
}

impl ObjectStore for TamperingStore {
    fn put(&self, address: &ContentAddress, payload: &[u8]) -> StoreResult<PutOutcome> {
        self.inner.put(address, payload)
    }

    fn get(&self, address: &ContentAddress) -> StoreResult<StoredObject> {
        let mut object = self.inner.get(address)?;
        if let Some(first) = object.payload.first_mut() {
            *first ^= 0xff;
        }
        Ok(object)
    }

    fn exists(&self, address: &ContentAddress) -> bool {
        self.inner.exists(address)
    }

    fn stats(&self) -> StoreResult<StoreStats> {
        self.inner.stats()
    }

    fn backend(&self) -> &'static str {
        "tampering"
    }
}

/// Fails every fallible operation with an I/O error.
pub struct FailingStore;

fn disk_on_fire() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk on fire"))
}

impl ObjectStore for FailingStore {
    fn put(&self, _address: &ContentAddress, _payload: &[u8]) -> StoreResult<PutOutcome> {
        Err(disk_on_fire())
    }

    fn get(&self, _address: &ContentAddress) -> StoreResult<StoredObject> {
        Err(disk_on_fire())
    }

    fn exists(&self, _address: &ContentAddress) -> bool {
        false
    }

    fn stats(&self) -> StoreResult<StoreStats> {
        Err(disk_on_fire())
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
