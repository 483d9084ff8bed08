//! Symmetric key encryption using AES-256-GCM.
//!
//! Keys are usually ECDH shared secret material. The IV is 32 bytes rather
//! than the standard 12, so the GCM pre-counter block is derived with GHASH.
//! The wire format is `IV (32) || ciphertext || tag (16)`.

use aes::Aes256;
use aes_gcm::aead::consts::U32;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{AesGcm, Key, Nonce};
use rand::RngCore;
use zeroize::Zeroize;

use crate::PrimitivesError;

/// Initialization vector length in bytes.
pub const IV_LEN: usize = 32;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Symmetric key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES-256-GCM with a 32-byte nonce and the default 16-byte tag.
type Aes256Gcm32 = AesGcm<Aes256, U32>;

/// A 32-byte AES-256-GCM key.
///
/// The key bytes are zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey {
    key: [u8; KEY_LEN],
}

impl SymmetricKey {
    /// Create a SymmetricKey from raw bytes.
    ///
    /// Input shorter than 32 bytes is left-padded with zeros; only the first
    /// 32 bytes of longer input are used.
    pub fn new(key: &[u8]) -> Self {
        let mut padded = [0u8; KEY_LEN];
        if key.len() < KEY_LEN {
            padded[KEY_LEN - key.len()..].copy_from_slice(key);
        } else {
            padded.copy_from_slice(&key[..KEY_LEN]);
        }
        SymmetricKey { key: padded }
    }

    /// Generate a random 32-byte symmetric key.
    pub fn new_random() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut key);
        SymmetricKey { key }
    }

    /// Encrypt `plaintext` under a fresh random IV.
    ///
    /// # Returns
    /// `IV (32) || ciphertext || tag (16)`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, PrimitivesError> {
        let mut iv = [0u8; IV_LEN];
        rand::rngs::OsRng.fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, &iv)
    }

    /// Encrypt `plaintext` under a caller-chosen IV.
    ///
    /// Reusing an IV with the same key breaks GCM confidentiality; this is
    /// meant for reproducible outputs.
    pub fn encrypt_with_iv(
        &self,
        plaintext: &[u8],
        iv: &[u8; IV_LEN],
    ) -> Result<Vec<u8>, PrimitivesError> {
        let ciphertext_and_tag = self
            .cipher()
            .encrypt(Nonce::<U32>::from_slice(iv), plaintext)
            .map_err(|e| PrimitivesError::EncryptionError(e.to_string()))?;

        let mut result = Vec::with_capacity(IV_LEN + ciphertext_and_tag.len());
        result.extend_from_slice(iv);
        result.extend_from_slice(&ciphertext_and_tag);
        Ok(result)
    }

    /// Decrypt `IV || ciphertext || tag`.
    ///
    /// Fails with a single opaque `DecryptionError` whether the key, IV,
    /// ciphertext or tag is wrong.
    pub fn decrypt(&self, message: &[u8]) -> Result<Vec<u8>, PrimitivesError> {
        if message.len() < IV_LEN + TAG_LEN {
            return Err(PrimitivesError::DecryptionError(format!(
                "ciphertext too short: {} bytes",
                message.len()
            )));
        }
        let (iv, ciphertext_and_tag) = message.split_at(IV_LEN);
        self.cipher()
            .decrypt(Nonce::<U32>::from_slice(iv), ciphertext_and_tag)
            .map_err(|_| PrimitivesError::DecryptionError("authentication failed".to_string()))
    }

    /// The raw key bytes.
    pub fn to_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    fn cipher(&self) -> Aes256Gcm32 {
        Aes256Gcm32::new(Key::<Aes256Gcm32>::from_slice(&self.key))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SymmetricKey {
        SymmetricKey::new(&(0u8..32).collect::<Vec<_>>())
    }

    fn test_iv() -> [u8; IV_LEN] {
        let mut iv = [0u8; IV_LEN];
        for (i, b) in iv.iter_mut().enumerate() {
            *b = 100 + i as u8;
        }
        iv
    }

    #[test]
    fn test_encrypt_known_answer() {
        let key = test_key();
        let out = key.encrypt_with_iv(b"a thing to encrypt", &test_iv()).unwrap();
        assert_eq!(
            hex::encode(&out),
            "6465666768696a6b6c6d6e6f707172737475767778797a7b7c7d7e7f80818283\
             ab61a7af217094553614661bf2b22ce522b5b8ccd1be39a4d3d123d23aff382ff69e"
        );
        assert_eq!(key.decrypt(&out).unwrap(), b"a thing to encrypt");
    }

    #[test]
    fn test_encrypt_empty_known_answer() {
        let key = test_key();
        let out = key.encrypt_with_iv(b"", &test_iv()).unwrap();
        assert_eq!(out.len(), IV_LEN + TAG_LEN);
        assert_eq!(
            hex::encode(&out),
            "6465666768696a6b6c6d6e6f707172737475767778797a7b7c7d7e7f80818283\
             86c9c75a42c1dcffd56f12e8e6c159d6"
        );
        assert_eq!(key.decrypt(&out).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_encrypt_decrypt_random_iv() {
        let key = SymmetricKey::new_random();
        let plaintext = b"this is a longer message spanning several AES blocks of data";
        let first = key.encrypt(plaintext).unwrap();
        let second = key.encrypt(plaintext).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), IV_LEN + plaintext.len() + TAG_LEN);
        assert_eq!(key.decrypt(&first).unwrap(), plaintext);
        assert_eq!(key.decrypt(&second).unwrap(), plaintext);
    }

    #[test]
    fn test_decrypt_rejects_tampering() {
        let key = test_key();
        let out = key.encrypt_with_iv(b"a thing to encrypt", &test_iv()).unwrap();

        for index in [0, IV_LEN, out.len() - 1] {
            let mut tampered = out.clone();
            tampered[index] ^= 0x01;
            let err = key.decrypt(&tampered).unwrap_err();
            assert!(matches!(err, PrimitivesError::DecryptionError(_)));
        }

        let other = SymmetricKey::new(&[7u8; 32]);
        assert!(matches!(other.decrypt(&out), Err(PrimitivesError::DecryptionError(_))));
    }

    #[test]
    fn test_decrypt_too_short() {
        let key = test_key();
        assert!(key.decrypt(&[0u8; IV_LEN + TAG_LEN - 1]).is_err());
        assert!(key.decrypt(&[]).is_err());
    }

    #[test]
    fn test_new_pads_and_truncates() {
        let short = SymmetricKey::new(&[0xab, 0xcd]);
        let mut expected = [0u8; 32];
        expected[30] = 0xab;
        expected[31] = 0xcd;
        assert_eq!(short.to_bytes(), &expected);

        let long = SymmetricKey::new(&[9u8; 40]);
        assert_eq!(long.to_bytes(), &[9u8; 32]);
        assert_eq!(format!("{:?}", long), "SymmetricKey(..)");
    }
}
