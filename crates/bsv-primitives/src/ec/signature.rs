//! ECDSA signature with DER serialization and RFC6979 deterministic nonces.
//!
//! Supports strict DER encoding/decoding, compact (recoverable) signatures
//! and their base64 text form, low-S normalization, and signature
//! verification.

use base64::Engine;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, RecoveryId, VerifyingKey};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::util::BsvReader;
use crate::PrimitivesError;

/// The secp256k1 curve order N.
/// N = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
pub const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// Half of the secp256k1 curve order (N/2), used for low-S normalization.
pub const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// Length of a compact recoverable signature: marker, R and S.
pub const COMPACT_LEN: usize = 65;

/// Smallest compact marker byte: uncompressed key, recovery id 0.
const COMPACT_MARKER_BASE: u8 = 27;

/// Added to the marker when the signer's key is serialized compressed.
const COMPACT_COMPRESSED_FLAG: u8 = 4;

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;

/// An ECDSA signature with R and S components.
///
/// Components are stored as 32-byte big-endian integers. Parsing rejects
/// zero and out-of-range values; [`Signature::new`] does not check them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// The R component of the signature (32 bytes, big-endian).
    r: [u8; 32],
    /// The S component of the signature (32 bytes, big-endian).
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S 32-byte arrays.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// Access the R component of the signature.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Access the S component of the signature.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Whether S is in the lower half of the curve order.
    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_ORDER
    }

    /// This signature with S replaced by `N - S` when S is above `N/2`.
    ///
    /// `(r, s)` and `(r, N - s)` verify against the same key and hash.
    pub fn to_low_s(&self) -> Signature {
        if self.is_low_s() {
            self.clone()
        } else {
            Signature {
                r: self.r,
                s: subtract_from_order(&self.s),
            }
        }
    }

    /// Parse a DER-encoded ECDSA signature.
    ///
    /// Expected format: `0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>`.
    /// Every length must match the bytes present exactly and both integers
    /// must be minimally encoded and non-negative.
    ///
    /// # Returns
    /// `InvalidDer` for any structural mismatch (including empty input) and
    /// `InvalidSignature` when R or S is zero or not below the curve order.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let invalid = || PrimitivesError::InvalidDer(hex::encode(bytes));

        let mut reader = BsvReader::new(bytes);
        if reader.read_u8().map_err(|_| invalid())? != DER_SEQUENCE {
            return Err(invalid());
        }
        let seq_len = reader.read_u8().map_err(|_| invalid())? as usize;
        if seq_len != reader.remaining() {
            return Err(invalid());
        }
        let r = read_der_integer(&mut reader).ok_or_else(invalid)?;
        let s = read_der_integer(&mut reader).ok_or_else(invalid)?;
        if reader.remaining() != 0 {
            return Err(invalid());
        }

        for (name, value) in [("R", &r), ("S", &s)] {
            if is_zero(value) {
                return Err(PrimitivesError::InvalidSignature(format!(
                    "signature {} is zero",
                    name
                )));
            }
            if *value >= CURVE_ORDER {
                return Err(PrimitivesError::InvalidSignature(format!(
                    "signature {} is >= curve.N",
                    name
                )));
            }
        }

        Ok(Signature { r, s })
    }

    /// Serialize the signature in DER format with low-S normalization.
    ///
    /// Output format: `0x30 <len> 0x02 <r_len> <r_bytes> 0x02 <s_len> <s_bytes>`.
    /// S is normalized to the lower half of the curve order per BIP-0062, so
    /// `(r, s)` and `(r, N - s)` serialize to the same bytes.
    pub fn to_der(&self) -> Vec<u8> {
        let low = self.to_low_s();
        let rb = canonicalize_int(&low.r);
        let sb = canonicalize_int(&low.s);

        let total_len = 6 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(DER_SEQUENCE);
        out.push((total_len - 2) as u8);
        out.push(DER_INTEGER);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(DER_INTEGER);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Sign a message hash using RFC6979 deterministic nonces.
    ///
    /// Produces a low-S normalized signature per BIP-0062.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let recoverable = RecoverableSignature::sign(hash, priv_key)?;
        Ok(recoverable.signature.to_low_s())
    }

    /// Verify this signature against a message hash and public key.
    ///
    /// # Returns
    /// `true` if the signature is valid, `false` otherwise.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        let k256_sig = match ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };

        let padded = normalize_hash(hash);
        pub_key
            .verifying_key()
            .verify_prehash(&padded, &k256_sig)
            .is_ok()
    }

    fn to_k256(&self) -> Result<ecdsa::Signature, PrimitivesError> {
        ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        )
        .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }
}

/// An ECDSA signature plus the recovery id needed to recover the signer's
/// public key from the signature and hash alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: u8,
}

impl RecoverableSignature {
    /// Pair a signature with a recovery id in `0..=3`.
    pub fn new(signature: Signature, recovery_id: u8) -> Result<Self, PrimitivesError> {
        if recovery_id > 3 {
            return Err(PrimitivesError::InvalidRecoverableSignature(format!(
                "recovery id {} out of range",
                recovery_id
            )));
        }
        Ok(RecoverableSignature {
            signature,
            recovery_id,
        })
    }

    /// The underlying `(r, s)` signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The recovery id in `0..=3`.
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// Sign a message hash, keeping the recovery id.
    ///
    /// S is always low; the recovery id matches the normalized signature.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let padded = normalize_hash(hash);
        let (k256_sig, recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(&padded)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let (r_bytes, s_bytes) = k256_sig.split_bytes();
        Ok(RecoverableSignature {
            signature: Signature::new(r_bytes.into(), s_bytes.into()),
            recovery_id: recovery_id.to_byte(),
        })
    }

    /// Serialize as 65 bytes: `marker || r || s`, where
    /// `marker = 27 + recovery_id + (4 if compressed)`.
    pub fn to_compact(&self, compressed: bool) -> [u8; COMPACT_LEN] {
        let mut out = [0u8; COMPACT_LEN];
        out[0] = COMPACT_MARKER_BASE
            + self.recovery_id
            + if compressed { COMPACT_COMPRESSED_FLAG } else { 0 };
        out[1..33].copy_from_slice(&self.signature.r);
        out[33..65].copy_from_slice(&self.signature.s);
        out
    }

    /// Parse the 65-byte compact form.
    ///
    /// # Returns
    /// The signature and whether the signer's key was compressed, or
    /// `InvalidRecoverableSignature` for a wrong length or a marker byte
    /// outside `27..=34`.
    pub fn from_compact(bytes: &[u8]) -> Result<(Self, bool), PrimitivesError> {
        if bytes.len() != COMPACT_LEN {
            return Err(PrimitivesError::InvalidRecoverableSignature(format!(
                "expected {} bytes, got {}",
                COMPACT_LEN,
                bytes.len()
            )));
        }
        let marker = bytes[0];
        let max_marker = COMPACT_MARKER_BASE + COMPACT_COMPRESSED_FLAG + 3;
        if !(COMPACT_MARKER_BASE..=max_marker).contains(&marker) {
            return Err(PrimitivesError::InvalidRecoverableSignature(format!(
                "marker byte {} out of range",
                marker
            )));
        }
        let flags = marker - COMPACT_MARKER_BASE;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[1..33]);
        s.copy_from_slice(&bytes[33..65]);
        let sig = RecoverableSignature {
            signature: Signature { r, s },
            recovery_id: flags & 3,
        };
        Ok((sig, flags & COMPACT_COMPRESSED_FLAG != 0))
    }

    /// Recover the public key that produced this signature over `hash`.
    pub fn recover_public_key(&self, hash: &[u8]) -> Result<PublicKey, PrimitivesError> {
        let recovery_id = RecoveryId::from_byte(self.recovery_id).ok_or_else(|| {
            PrimitivesError::InvalidRecoverableSignature("invalid recovery id".to_string())
        })?;
        let k256_sig = self.signature.to_k256()?;

        let padded = normalize_hash(hash);
        let recovered = VerifyingKey::recover_from_prehash(&padded, &k256_sig, recovery_id)
            .map_err(|e| PrimitivesError::InvalidRecoverableSignature(e.to_string()))?;
        Ok(PublicKey::from_k256_verifying_key(&recovered))
    }
}

/// Base64-encode a 65-byte compact recoverable signature.
pub fn stringify_recoverable(compact: &[u8; COMPACT_LEN]) -> String {
    base64::engine::general_purpose::STANDARD.encode(compact)
}

/// Decode base64 text into the 65-byte compact form and its compression flag.
pub fn unstringify_recoverable(text: &str) -> Result<([u8; COMPACT_LEN], bool), PrimitivesError> {
    let decoded = base64::engine::general_purpose::STANDARD.decode(text)?;
    let (_, compressed) = RecoverableSignature::from_compact(&decoded)?;
    let mut out = [0u8; COMPACT_LEN];
    out.copy_from_slice(&decoded);
    Ok((out, compressed))
}

/// Read one DER INTEGER as a 32-byte big-endian value.
///
/// Returns `None` for a wrong tag, truncated content, an empty or negative
/// integer, a redundant leading zero, or a value wider than 32 bytes.
fn read_der_integer(reader: &mut BsvReader<'_>) -> Option<[u8; 32]> {
    if reader.read_u8().ok()? != DER_INTEGER {
        return None;
    }
    let len = reader.read_u8().ok()? as usize;
    let value = reader.read_bytes(len).ok()?;
    let magnitude = match value {
        [] => return None,
        [first, ..] if first & 0x80 != 0 => return None,
        [0, second, ..] if second & 0x80 == 0 => return None,
        [0, rest @ ..] if !rest.is_empty() => rest,
        _ => value,
    };
    if magnitude.len() > 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out[32 - magnitude.len()..].copy_from_slice(magnitude);
    Some(out)
}

/// Normalize an arbitrary-length hash to exactly 32 bytes for secp256k1 ECDSA.
///
/// Pads shorter hashes with leading zeros, truncates longer hashes.
fn normalize_hash(hash: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    if hash.len() >= 32 {
        padded.copy_from_slice(&hash[..32]);
    } else {
        padded[32 - hash.len()..].copy_from_slice(hash);
    }
    padded
}

/// Canonicalize an integer for DER encoding.
///
/// Strips leading zeros from the big-endian representation and adds
/// a 0x00 padding byte if the high bit is set.
fn canonicalize_int(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];

    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0x00);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}

fn is_zero(val: &[u8; 32]) -> bool {
    val.iter().all(|&b| b == 0)
}

/// Compute N - val where N is the secp256k1 curve order.
fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;
    for i in (0..32).rev() {
        let diff = CURVE_ORDER[i] as i32 - val[i] as i32 - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }
    result
}
