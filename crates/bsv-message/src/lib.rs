#![deny(missing_docs)]

//! BSV Blockchain SDK - BRC-78 message encryption.
//!
//! Provides encrypted message exchange between two parties using BRC-42
//! derived child keys and AES-256-GCM, in a versioned binary envelope.

mod error;
pub mod encrypted;

pub use error::MessageError;
pub use encrypted::{decrypt, encrypt, EncryptedMessage};
