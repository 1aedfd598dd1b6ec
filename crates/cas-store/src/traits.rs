use cas_types::ContentAddress;

use crate::error::StoreResult;
use crate::object::{PutOutcome, StoreStats, StoredObject};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. A `put` for an address that already
///   exists succeeds without rewriting and reports [`PutOutcome::AlreadyPresent`].
/// - The check-then-insert inside `put` is atomic per address: of any number
///   of concurrent puts for one address, exactly one reports
///   [`PutOutcome::Created`].
/// - Once `put` returns, every later `get`/`exists` of that address sees it.
/// - The store never interprets or hashes payloads.
pub trait ObjectStore: Send + Sync {
    /// Persist `payload` under `address` unless the address is already taken.
    fn put(&self, address: &ContentAddress, payload: &[u8]) -> StoreResult<PutOutcome>;

    /// Fetch the object stored under `address`.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if absent.
    fn get(&self, address: &ContentAddress) -> StoreResult<StoredObject>;

    /// Check whether an object exists. Never fails; backend errors read as absent.
    fn exists(&self, address: &ContentAddress) -> bool;

    /// Object count and payload bytes currently held.
    fn stats(&self) -> StoreResult<StoreStats>;

    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;
}
