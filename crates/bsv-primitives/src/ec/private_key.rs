//! secp256k1 private key with Bitcoin-specific functionality.
//!
//! Wraps k256 signing key and adds WIF encoding, child key derivation (BRC-42),
//! shared secret computation, and DER and recoverable signing.

use k256::ecdsa::SigningKey;
use k256::{NonZeroScalar, Scalar};
use rand::rngs::OsRng;

use crate::address::Network;
use crate::ec::derivation::{derivation_offset, SharedSecret};
use crate::ec::public_key::PublicKey;
use crate::ec::signature::{RecoverableSignature, Signature};
use crate::wif::{decode_wif, encode_wif, PRIVATE_KEY_LEN};
use crate::PrimitivesError;

/// A secp256k1 private key for signing and key derivation.
///
/// Wraps a k256 `SigningKey` and provides Bitcoin-specific functionality
/// including WIF serialization, BRC-42 child derivation, and ECDH shared secrets.
/// The inner scalar is zeroized when the key is dropped.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    ///
    /// # Returns
    /// A new randomly generated `PrivateKey`.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes represent a valid scalar on secp256k1,
    /// or an error if the scalar is zero or out of range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_LEN,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| PrimitivesError::InvalidPrivateKey("scalar out of range".to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a hexadecimal string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string representing the 32-byte scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Create a private key from a WIF (Wallet Import Format) string.
    ///
    /// The network and compression flag carried by the WIF are discarded;
    /// use [`decode_wif`] directly to inspect them.
    ///
    /// # Arguments
    /// * `wif` - A Base58Check-encoded WIF string (compressed or uncompressed).
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, or an error if the WIF is malformed or the checksum fails.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let (key_bytes, _compressed, _network) = decode_wif(wif)?;
        Self::from_bytes(&key_bytes)
    }

    /// Encode the private key as WIF for `network`.
    ///
    /// # Arguments
    /// * `network` - Selects the version byte (0x80 mainnet, 0xef testnet).
    /// * `compressed` - Whether to append the compressed-public-key flag.
    pub fn to_wif(&self, network: Network, compressed: bool) -> String {
        encode_wif(&self.to_bytes(), compressed, network)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LEN] {
        self.inner.to_bytes().into()
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the corresponding public key for this private key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a message hash using deterministic RFC6979 nonces.
    ///
    /// Produces a low-S normalized signature per BIP-0062.
    ///
    /// # Arguments
    /// * `hash` - The message hash to sign (should be 32 bytes).
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// Sign a message hash and keep the recovery id.
    pub fn sign_recoverable(&self, hash: &[u8]) -> Result<RecoverableSignature, PrimitivesError> {
        RecoverableSignature::sign(hash, self)
    }

    /// Compute an ECDH shared secret with another public key.
    ///
    /// # Arguments
    /// * `pub_key` - The other party's public key.
    ///
    /// # Returns
    /// The compressed shared point, or an error if the product is the identity.
    pub fn derive_shared_secret(&self, pub_key: &PublicKey) -> Result<SharedSecret, PrimitivesError> {
        SharedSecret::derive(self, pub_key)
    }

    /// Derive a child private key using BRC-42 key derivation.
    ///
    /// Computes an ECDH shared secret with the counterparty, then
    /// `child = self + HMAC-SHA256(shared_secret, invoice_number) mod n`.
    /// The counterparty derives the matching public key with
    /// [`PublicKey::derive_child_public`].
    ///
    /// # Arguments
    /// * `counterparty` - The counterparty's public key.
    /// * `invoice_number` - The invoice number string used as HMAC data.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` with the derived child key, or `DerivationFailed` if
    /// the child scalar is zero.
    pub fn derive_child_private(
        &self,
        counterparty: &PublicKey,
        invoice_number: &str,
    ) -> Result<PrivateKey, PrimitivesError> {
        let shared_secret = self.derive_shared_secret(counterparty)?;
        let offset = derivation_offset(&shared_secret, invoice_number);
        let child = self.to_scalar() + offset;

        let child = Option::<NonZeroScalar>::from(NonZeroScalar::new(child)).ok_or_else(|| {
            tracing::debug!("derived child private key is zero");
            PrimitivesError::DerivationFailed("child private key is zero".to_string())
        })?;
        Ok(PrivateKey {
            inner: SigningKey::from(child),
        })
    }

    /// Access the underlying k256 `SigningKey`.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }

    /// Convert the private key to a k256 `Scalar` for arithmetic operations.
    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for PrivateKey {}
