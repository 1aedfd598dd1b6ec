//! Content-addressed object storage for the CAS storage node.
//!
//! Every payload is stored as an immutable object keyed by its
//! [`ContentAddress`](cas_types::ContentAddress). The store never computes or
//! checks addresses itself; callers derive the address and verify payloads on
//! read.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- sharded concurrent map for tests and embedding
//! - [`FileObjectStore`] -- one framed file per object under a fan-out tree
//!
//! # Design Rules
//!
//! 1. Objects are write-once: a second put of an existing address is a no-op.
//! 2. Insert-if-absent is atomic; concurrent puts of one address create one object.
//! 3. Readers never observe a partially written payload.
//! 4. No lock spans unrelated addresses.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use file::FileObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{PutOutcome, StoreStats, StoredObject};
pub use traits::ObjectStore;
