/// Elliptic curve cryptography on secp256k1.
///
/// Provides private keys, public keys, DER and recoverable ECDSA signatures,
/// BRC-42 key derivation with ECDH shared secrets, and symmetric encryption.

pub mod private_key;
pub mod public_key;
pub mod signature;
pub mod derivation;
pub mod symmetric;

pub use derivation::{InvoiceNumber, SecurityLevel, SharedSecret};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{RecoverableSignature, Signature};
pub use symmetric::SymmetricKey;
