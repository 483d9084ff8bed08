//! BRC-78 message encryption and decryption.
//!
//! <https://github.com/bitcoin-sv/BRCs/blob/master/peer-to-peer/0078.md>
//!
//! Envelope layout:
//! `version (4) || sender_pubkey (33) || recipient_pubkey (33) || key_id (32) || iv (32) || ciphertext || tag (16)`

use rand::RngCore;

use bsv_primitives::ec::public_key::COMPRESSED_LEN;
use bsv_primitives::ec::symmetric::{IV_LEN, TAG_LEN};
use bsv_primitives::ec::{InvoiceNumber, PrivateKey, PublicKey, SymmetricKey};
use bsv_primitives::util::{BsvReader, BsvWriter};

use crate::MessageError;

/// BRC-78 encrypted message version tag.
pub const VERSION: [u8; 4] = [0x42, 0x42, 0x10, 0x33];

/// Length of the per-message key id.
pub const KEY_ID_LEN: usize = 32;

/// Length of the fixed header preceding the encrypted payload.
pub const HEADER_LEN: usize = VERSION.len() + 2 * COMPRESSED_LEN + KEY_ID_LEN;

/// Shortest valid envelope: a header and an encrypted empty message.
pub const MIN_LEN: usize = HEADER_LEN + IV_LEN + TAG_LEN;

/// A parsed view over an encrypted message envelope.
///
/// Parsing checks the length, the version tag and the sender key; it does
/// not check who the message is addressed to.
#[derive(Debug)]
pub struct EncryptedMessage<'a> {
    sender: PublicKey,
    recipient: [u8; COMPRESSED_LEN],
    key_id: [u8; KEY_ID_LEN],
    payload: &'a [u8],
}

impl<'a> EncryptedMessage<'a> {
    /// Split an envelope into its fields.
    ///
    /// # Returns
    /// `MessageTooShort` for truncated input, `VersionMismatch` for an
    /// unknown version tag, or a primitives error if the sender key is not
    /// a valid point.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, MessageError> {
        if bytes.len() < MIN_LEN {
            return Err(MessageError::MessageTooShort {
                expected: MIN_LEN,
                actual: bytes.len(),
            });
        }

        let mut reader = BsvReader::new(bytes);
        let version: [u8; 4] = reader.read_array()?;
        if version != VERSION {
            return Err(MessageError::VersionMismatch {
                expected: hex::encode(VERSION),
                received: hex::encode(version),
            });
        }
        let sender = PublicKey::from_bytes(reader.read_bytes(COMPRESSED_LEN)?)?;
        let recipient = reader.read_array()?;
        let key_id = reader.read_array()?;

        Ok(EncryptedMessage {
            sender,
            recipient,
            key_id,
            payload: reader.read_remaining(),
        })
    }

    /// The sender's public key.
    pub fn sender(&self) -> &PublicKey {
        &self.sender
    }

    /// The compressed public key the message is addressed to.
    pub fn recipient(&self) -> &[u8; COMPRESSED_LEN] {
        &self.recipient
    }

    /// The per-message key id.
    pub fn key_id(&self) -> &[u8; KEY_ID_LEN] {
        &self.key_id
    }

    /// `iv || ciphertext || tag`.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Decrypt the payload with the recipient's private key.
    ///
    /// Fails with `RecipientMismatch` if `recipient` is not the key the
    /// message was addressed to.
    pub fn decrypt(&self, recipient: &PrivateKey) -> Result<Vec<u8>, MessageError> {
        let actual = recipient.pub_key().to_compressed();
        if actual != self.recipient {
            return Err(MessageError::RecipientMismatch {
                expected: hex::encode(self.recipient),
                actual: hex::encode(actual),
            });
        }

        let invoice_number = InvoiceNumber::message_encryption(&self.key_id);
        let recipient_child =
            recipient.derive_child_private(&self.sender, invoice_number.as_str())?;
        let sender_child = self
            .sender
            .derive_child_public(recipient, invoice_number.as_str())?;
        let shared_secret = recipient_child.derive_shared_secret(&sender_child)?;

        let key = SymmetricKey::new(shared_secret.key_material());
        Ok(key.decrypt(self.payload)?)
    }
}

/// Encrypt a message using the sender's private key and the recipient's public key (BRC-78).
///
/// A fresh random key id binds the derived keys to this message alone.
pub fn encrypt(
    message: &[u8],
    sender: &PrivateKey,
    recipient: &PublicKey,
) -> Result<Vec<u8>, MessageError> {
    let mut key_id = [0u8; KEY_ID_LEN];
    rand::rngs::OsRng.fill_bytes(&mut key_id);

    let invoice_number = InvoiceNumber::message_encryption(&key_id);
    let sender_child = sender.derive_child_private(recipient, invoice_number.as_str())?;
    let recipient_child = recipient.derive_child_public(sender, invoice_number.as_str())?;
    let shared_secret = sender_child.derive_shared_secret(&recipient_child)?;

    let key = SymmetricKey::new(shared_secret.key_material());
    let payload = key.encrypt(message)?;

    let mut writer = BsvWriter::with_capacity(HEADER_LEN + payload.len());
    writer.write_bytes(&VERSION);
    writer.write_bytes(&sender.pub_key().to_compressed());
    writer.write_bytes(&recipient.to_compressed());
    writer.write_bytes(&key_id);
    writer.write_bytes(&payload);

    tracing::debug!(ciphertext_len = payload.len(), "built encrypted message");
    Ok(writer.into_bytes())
}

/// Decrypt a BRC-78 encrypted message using the recipient's private key.
///
/// Every failure is reported as `DecryptionFailed`, wrapping the original
/// cause (truncation, version or recipient mismatch, or an authentication
/// failure). Use [`MessageError::cause`] to inspect it.
pub fn decrypt(message: &[u8], recipient: &PrivateKey) -> Result<Vec<u8>, MessageError> {
    EncryptedMessage::parse(message)
        .and_then(|parsed| parsed.decrypt(recipient))
        .map_err(|err| {
            tracing::debug!(reason = %err, "rejected encrypted message");
            MessageError::DecryptionFailed(Box::new(err))
        })
}
