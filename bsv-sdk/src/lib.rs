#![deny(missing_docs)]

//! BSV Blockchain SDK - wallet cryptographic core.
//!
//! Re-exports the primitives (encodings, keys, signatures, BRC-42 derivation)
//! and BRC-78 message encryption for convenient single-crate usage.

pub use bsv_primitives as primitives;
pub use bsv_message as message;
