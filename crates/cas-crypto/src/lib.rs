//! Address derivation for the CAS storage node.
//!
//! [`AddressCodec`] maps payload bytes to a [`ContentAddress`] with a fixed
//! hash function and converts addresses to and from their canonical text
//! form. SHA3-256 is the default digest; BLAKE3 can be selected per node.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.
//!
//! [`ContentAddress`]: cas_types::ContentAddress

pub mod codec;

pub use codec::{AddressCodec, HashAlgorithm, MalformedAddress};
