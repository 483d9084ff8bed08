/// Unified error type for all primitives operations.
///
/// Covers malformed binary and text input, checksum failures, integer range
/// violations, EC key errors, key derivation and symmetric encryption.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid DER encoded {0}")]
    InvalidDer(String),

    #[error("invalid recoverable ECDSA signature: {0}")]
    InvalidRecoverableSignature(String),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("invalid P2PKH address: {0}")]
    InvalidAddress(String),

    #[error("unmatched base58 checksum")]
    ChecksumMismatch,

    #[error("point not on curve")]
    PointNotOnCurve,

    #[error("key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("invalid invoice number: {0}")]
    InvalidInvoiceNumber(String),

    #[error("encryption error: {0}")]
    EncryptionError(String),

    #[error("decryption error: {0}")]
    DecryptionError(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("invalid bit string: {0}")]
    InvalidBits(String),

    #[error("invalid varint: {0}")]
    InvalidVarInt(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<base64::DecodeError> for PrimitivesError {
    fn from(e: base64::DecodeError) -> Self {
        PrimitivesError::InvalidBase64(e.to_string())
    }
}

impl From<k256::elliptic_curve::Error> for PrimitivesError {
    fn from(_: k256::elliptic_curve::Error) -> Self {
        PrimitivesError::PointNotOnCurve
    }
}

impl From<k256::ecdsa::Error> for PrimitivesError {
    fn from(e: k256::ecdsa::Error) -> Self {
        PrimitivesError::InvalidSignature(e.to_string())
    }
}
