//! secp256k1 public key with Bitcoin-specific functionality.
//!
//! Supports compressed/uncompressed serialization, child key derivation (BRC-42),
//! address generation, and signature verification.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::ProjectivePoint;
use std::fmt;

use crate::address::{Address, Network};
use crate::ec::derivation::{derivation_offset, offset_point, SharedSecret};
use crate::ec::private_key::PrivateKey;
use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key for verification and key derivation.
///
/// Wraps a k256 `VerifyingKey`, which never holds the identity point.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from raw SEC1 encoded bytes.
    ///
    /// Accepts both compressed (33-byte) and uncompressed (65-byte) formats.
    ///
    /// # Arguments
    /// * `bytes` - SEC1-encoded public key bytes.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the bytes don't represent a valid point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey string is empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| {
            PrimitivesError::InvalidPublicKey(format!("{} is not a valid point", hex::encode(bytes)))
        })?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize as a 33-byte compressed SEC1 point.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let encoded = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Serialize as a 65-byte uncompressed SEC1 point.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let encoded = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Compressed form as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Hash160 of the compressed public key.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// P2PKH address of the compressed public key on `network`.
    pub fn to_address(&self, network: Network) -> Address {
        Address::from_public_key_hash(&self.hash160(), network)
    }

    /// Verify an ECDSA signature over `hash` against this key.
    pub fn verify(&self, hash: &[u8], sig: &Signature) -> bool {
        sig.verify(hash, self)
    }

    /// Derive a child public key using BRC-42 key derivation.
    ///
    /// `child = self + HMAC-SHA256(ECDH(counterparty, self), invoice_number) * G`.
    /// This is the public half of the key the owner of `self` derives with
    /// [`PrivateKey::derive_child_private`] against `counterparty`'s public key.
    ///
    /// # Arguments
    /// * `counterparty` - The private key of the other party.
    /// * `invoice_number` - The invoice number string used as HMAC data.
    ///
    /// # Returns
    /// The derived public key, or `DerivationFailed` if the sum is the identity.
    pub fn derive_child_public(
        &self,
        counterparty: &PrivateKey,
        invoice_number: &str,
    ) -> Result<PublicKey, PrimitivesError> {
        let shared_secret = self.derive_shared_secret(counterparty)?;
        let offset = derivation_offset(&shared_secret, invoice_number);
        let child = self.to_projective_point() + offset_point(&offset);

        let inner = VerifyingKey::from_affine(child.to_affine()).map_err(|_| {
            tracing::debug!("derived child public key is the point at infinity");
            PrimitivesError::DerivationFailed("child public key is the identity".to_string())
        })?;
        Ok(PublicKey { inner })
    }

    /// Compute an ECDH shared secret with a private key.
    pub fn derive_shared_secret(
        &self,
        priv_key: &PrivateKey,
    ) -> Result<SharedSecret, PrimitivesError> {
        SharedSecret::derive(priv_key, self)
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    pub(crate) fn to_projective_point(&self) -> ProjectivePoint {
        ProjectivePoint::from(*self.inner.as_affine())
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
