//! BRC-42 key derivation building blocks.
//!
//! An ECDH shared secret between two parties, keyed HMAC over an invoice
//! number, and the resulting scalar offset. Both the private-key holder and
//! the public-key holder compute the same offset, so a child private key and
//! the matching child public key can be derived independently.
//!
//! See BRC-42: https://github.com/bitcoin-sv/BRCs/blob/master/key-derivation/0042.md
//! and BRC-43 for the invoice number format.

use std::fmt;
use std::sync::LazyLock;

use base64::Engine;
use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{ProjectivePoint, Scalar, U256};
use regex::Regex;
use zeroize::Zeroize;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::hash::sha256_hmac;
use crate::PrimitivesError;

/// Length of a compressed shared secret point in bytes.
pub const SHARED_SECRET_LEN: usize = 33;

/// Protocol name used by the BRC-78 message encryption scheme.
pub const MESSAGE_ENCRYPTION_PROTOCOL: &str = "message encryption";

static RE_ONLY_LETTERS_NUMBERS_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9 ]+$").expect("static regex is valid"));

/// An ECDH shared secret: the compressed encoding of `priv_a * pub_b`.
///
/// The leading parity byte is part of the HMAC key used for derivation
/// offsets, but only bytes `[1..]` are ever used as symmetric key material.
/// The bytes are zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret([u8; SHARED_SECRET_LEN]);

impl SharedSecret {
    /// Compute `private_key * public_key` and serialize it compressed.
    ///
    /// Fails with `InvalidPublicKey` if the product is the identity point.
    pub fn derive(
        private_key: &PrivateKey,
        public_key: &PublicKey,
    ) -> Result<Self, PrimitivesError> {
        let point = public_key.to_projective_point() * private_key.to_scalar();
        if bool::from(point.is_identity()) {
            return Err(PrimitivesError::InvalidPublicKey(
                "shared secret is the point at infinity".to_string(),
            ));
        }
        let encoded = point.to_affine().to_encoded_point(true);
        let mut out = [0u8; SHARED_SECRET_LEN];
        out.copy_from_slice(encoded.as_bytes());
        Ok(SharedSecret(out))
    }

    /// The full 33-byte compressed point.
    pub fn to_compressed(&self) -> [u8; SHARED_SECRET_LEN] {
        self.0
    }

    /// The 32-byte x coordinate, used as symmetric key material.
    pub fn key_material(&self) -> &[u8] {
        &self.0[1..]
    }

    /// Interpret the shared point as a public key.
    pub fn to_public_key(&self) -> Result<PublicKey, PrimitivesError> {
        PublicKey::from_bytes(&self.0)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Compute the BRC-42 derivation offset for a shared secret and invoice.
///
/// `offset = HMAC-SHA256(key = shared_secret(33), data = invoice_utf8) mod n`.
pub fn derivation_offset(shared_secret: &SharedSecret, invoice_number: &str) -> Scalar {
    let mut mac = sha256_hmac(&shared_secret.0, invoice_number.as_bytes());
    let offset = <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(&mac));
    mac.zeroize();
    offset
}

/// `offset * G` for the public-key side of a derivation.
pub(crate) fn offset_point(offset: &Scalar) -> ProjectivePoint {
    ProjectivePoint::GENERATOR * offset
}

/// BRC-43 security level of a protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecurityLevel {
    /// Silent: no user interaction.
    Silent = 0,
    /// Requires approval once per application.
    App = 1,
    /// Requires approval once per counterparty for each application.
    Counterparty = 2,
}

impl TryFrom<u8> for SecurityLevel {
    type Error = PrimitivesError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(SecurityLevel::Silent),
            1 => Ok(SecurityLevel::App),
            2 => Ok(SecurityLevel::Counterparty),
            _ => Err(PrimitivesError::InvalidInvoiceNumber(
                "protocol security level must be 0, 1, or 2".to_string(),
            )),
        }
    }
}

/// A BRC-43 invoice number: `"<security level>-<protocol>-<key id>"`.
///
/// Binds a derived key to one protocol and one key id, so a key derived for
/// one purpose never collides with a key derived for another.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Build and validate an invoice number.
    ///
    /// The protocol name is trimmed and lowercased, then must be 5 to 400
    /// characters of letters, digits and single spaces and must not end in
    /// `" protocol"`. The key id must be 1 to 800 characters.
    pub fn new(
        security_level: SecurityLevel,
        protocol: &str,
        key_id: &str,
    ) -> Result<Self, PrimitivesError> {
        if key_id.is_empty() {
            return Err(PrimitivesError::InvalidInvoiceNumber(
                "key IDs must be 1 character or more".to_string(),
            ));
        }
        if key_id.len() > 800 {
            return Err(PrimitivesError::InvalidInvoiceNumber(
                "key IDs must be 800 characters or less".to_string(),
            ));
        }

        let protocol = protocol.trim().to_lowercase();
        if protocol.len() < 5 {
            return Err(PrimitivesError::InvalidInvoiceNumber(
                "protocol names must be 5 characters or more".to_string(),
            ));
        }
        if protocol.len() > 400 {
            return Err(PrimitivesError::InvalidInvoiceNumber(
                "protocol names must be 400 characters or less".to_string(),
            ));
        }
        if protocol.contains("  ") {
            return Err(PrimitivesError::InvalidInvoiceNumber(
                "protocol names cannot contain multiple consecutive spaces".to_string(),
            ));
        }
        if !RE_ONLY_LETTERS_NUMBERS_SPACES.is_match(&protocol) {
            return Err(PrimitivesError::InvalidInvoiceNumber(
                "protocol names can only contain letters, numbers and spaces".to_string(),
            ));
        }
        if protocol.ends_with(" protocol") {
            return Err(PrimitivesError::InvalidInvoiceNumber(
                "no need to end your protocol name with \" protocol\"".to_string(),
            ));
        }

        Ok(InvoiceNumber(format!(
            "{}-{}-{}",
            security_level as u8, protocol, key_id
        )))
    }

    /// The invoice number used by BRC-78 message encryption:
    /// `"2-message encryption-" + base64(key_id)`.
    pub fn message_encryption(key_id: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(key_id);
        InvoiceNumber(format!(
            "{}-{}-{}",
            SecurityLevel::Counterparty as u8,
            MESSAGE_ENCRYPTION_PROTOCOL,
            encoded
        ))
    }

    /// The rendered invoice number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InvoiceNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Invoice numbers embed key ids; keep them out of debug output.
impl fmt::Debug for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InvoiceNumber(..)")
    }
}
