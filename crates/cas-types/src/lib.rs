//! Foundation types for the CAS storage node.
//!
//! Every other `cas-*` crate depends on `cas-types`.
//!
//! # Key Types
//!
//! - [`ContentAddress`] -- 256-bit digest identifying a payload, rendered as
//!   `0x` followed by 64 lowercase hex characters

pub mod address;
pub mod error;

pub use address::{ContentAddress, ADDRESS_LEN, ADDRESS_PREFIX, ENCODED_LEN};
pub use error::TypeError;
