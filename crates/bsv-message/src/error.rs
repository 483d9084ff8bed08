/// Error types for message operations.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// A key, derivation or cipher operation failed.
    #[error("{0}")]
    Primitives(#[from] bsv_primitives::PrimitivesError),

    /// The envelope carries an unsupported version tag.
    #[error("message version mismatch: Expected {expected}, received {received}")]
    VersionMismatch {
        /// Hex of the supported version.
        expected: String,
        /// Hex of the version found in the envelope.
        received: String,
    },

    /// The envelope is addressed to a different public key.
    #[error("the encrypted message expects a recipient public key of {expected}, but the provided key is {actual}")]
    RecipientMismatch {
        /// Hex of the recipient key in the envelope.
        expected: String,
        /// Hex of the key that attempted decryption.
        actual: String,
    },

    /// The envelope is shorter than its fixed-width fields.
    #[error("message too short: expected at least {expected} bytes, got {actual} bytes")]
    MessageTooShort {
        /// Minimum envelope length.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// Decryption failed; the wrapped error is the original cause.
    #[error("failed to decrypt message: {0}")]
    DecryptionFailed(#[source] Box<MessageError>),
}

impl MessageError {
    /// The underlying cause of a `DecryptionFailed`, or `self` otherwise.
    pub fn cause(&self) -> &MessageError {
        match self {
            MessageError::DecryptionFailed(inner) => inner,
            other => other,
        }
    }
}
