//! Write and read paths of the CAS storage node.
//!
//! - [`WriteCoordinator`] validates a payload, derives its address, skips
//!   payloads that are already stored, and commits new ones.
//! - [`ReadCoordinator`] parses an address, fetches the object, and rehashes
//!   it before handing the bytes back.
//!
//! Both share one [`ObjectStore`](cas_store::ObjectStore) through an `Arc`
//! and hold no other mutable state, so any number of calls may run in
//! parallel.

pub mod config;
pub mod error;
pub mod read;
pub mod write;

pub use config::{EngineConfig, DEFAULT_MAX_PAYLOAD_SIZE};
pub use error::{EngineError, EngineResult};
pub use read::ReadCoordinator;
pub use write::WriteCoordinator;

#[cfg(test)]
pub(crate) mod testing;
