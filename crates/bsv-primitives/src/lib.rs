/// BSV Blockchain SDK - Cryptographic primitives, encodings, and key derivation.
///
/// This crate provides the foundational building blocks for the BSV SDK:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160, HMAC)
/// - Variable-length and fixed-width integer encoding, bit strings
/// - Base58 and Base58Check encoding/decoding
/// - P2PKH addresses and WIF private keys
/// - Elliptic curve cryptography (secp256k1 keys, DER and recoverable signatures)
/// - BRC-42 child key derivation and ECDH shared secrets
/// - AES-256-GCM symmetric encryption

pub mod hash;
pub mod util;
pub mod base58;
pub mod address;
pub mod wif;
pub mod ec;

mod error;
pub use error::PrimitivesError;

pub use address::Network;
