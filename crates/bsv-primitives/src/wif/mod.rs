//! Wallet Import Format (WIF) for private keys.
//!
//! `Base58Check(version || key(32) [|| 0x01])`: the version byte selects the
//! network and the optional trailing `0x01` marks a key whose public key is
//! serialized compressed.

use crate::address::Network;
use crate::base58;
use crate::PrimitivesError;

/// Length of a raw private key scalar in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// Flag byte appended to the key for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// Encode a raw 32-byte private key as WIF.
pub fn encode_wif(key: &[u8; PRIVATE_KEY_LEN], compressed: bool, network: Network) -> String {
    let mut payload = Vec::with_capacity(2 + PRIVATE_KEY_LEN);
    payload.push(network.params().wif_prefix);
    payload.extend_from_slice(key);
    if compressed {
        payload.push(COMPRESS_MAGIC);
    }
    base58::check_encode(&payload)
}

/// Decode a WIF string.
///
/// # Returns
/// `(key_bytes, is_compressed, network)`. Fails with `ChecksumMismatch` for
/// a bad checksum and `InvalidWif` for an unknown prefix, a bad payload
/// length, or a 33-byte payload whose last byte is not `0x01`.
pub fn decode_wif(wif: &str) -> Result<([u8; PRIVATE_KEY_LEN], bool, Network), PrimitivesError> {
    let payload = base58::check_decode(wif)?;
    let (&prefix, body) = payload
        .split_first()
        .ok_or_else(|| PrimitivesError::InvalidWif("empty payload".to_string()))?;
    let network = Network::from_wif_prefix(prefix).ok_or_else(|| {
        PrimitivesError::InvalidWif(format!("unknown WIF prefix {:02x}", prefix))
    })?;

    let compressed = match body.len() {
        PRIVATE_KEY_LEN => false,
        n if n == PRIVATE_KEY_LEN + 1 => {
            if body[PRIVATE_KEY_LEN] != COMPRESS_MAGIC {
                return Err(PrimitivesError::InvalidWif(
                    "malformed private key: invalid compression flag".to_string(),
                ));
            }
            true
        }
        n => {
            return Err(PrimitivesError::InvalidWif(format!(
                "malformed private key: invalid length {}",
                n
            )))
        }
    };

    let mut key = [0u8; PRIVATE_KEY_LEN];
    key.copy_from_slice(&body[..PRIVATE_KEY_LEN]);
    Ok((key, compressed, network))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "f97c89aaacf0cd2e47ddbacc97dae1f88bec49106ac37716c451dcdd008a4b62";

    fn key() -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&hex::decode(KEY_HEX).unwrap());
        out
    }

    #[test]
    fn test_decode_wif_vectors() {
        let cases = [
            ("L5agPjZKceSTkhqZF2dmFptT5LFrbr6ZGPvP7u4A6dvhTrr71WZ9", true, Network::Mainnet),
            ("5KiANv9EHEU4o9oLzZ6A7z4xJJ3uvfK2RLEubBtTz1fSwAbpJ2U", false, Network::Mainnet),
            ("cVwfreZB3i8iv9JpdSStd9PWhZZGGJCFLS4rEKWfbkahibwhticA", true, Network::Testnet),
            ("93UnxexmsTYCmDJdctz4zacuwxQd5prDmH6rfpEyKkQViAVA3me", false, Network::Testnet),
        ];
        for (wif, compressed, network) in cases {
            let decoded = decode_wif(wif).unwrap();
            assert_eq!(decoded, (key(), compressed, network), "{}", wif);
            assert_eq!(encode_wif(&key(), compressed, network), wif);
        }
    }

    #[test]
    fn test_decode_wif_unknown_prefix() {
        let mut payload = vec![0xff];
        payload.extend_from_slice(&key());
        let err = decode_wif(&base58::check_encode(&payload)).unwrap_err();
        assert!(matches!(err, PrimitivesError::InvalidWif(_)));
        assert!(err.to_string().contains("unknown WIF prefix"));
    }

    #[test]
    fn test_decode_wif_bad_compression_flag() {
        let mut payload = vec![0x80];
        payload.extend_from_slice(&key());
        payload.push(0x02);
        assert!(matches!(
            decode_wif(&base58::check_encode(&payload)),
            Err(PrimitivesError::InvalidWif(_))
        ));
    }

    #[test]
    fn test_decode_wif_bad_length() {
        let mut payload = vec![0x80];
        payload.extend_from_slice(&key()[..31]);
        assert!(matches!(
            decode_wif(&base58::check_encode(&payload)),
            Err(PrimitivesError::InvalidWif(_))
        ));
    }

    #[test]
    fn test_decode_wif_bad_checksum() {
        // truncated by one character
        assert!(decode_wif("L5agPjZKceSTkhqZF2dmFptT5LFrbr6ZGPvP7u4A6dvhTrr71WZ").is_err());
        // modified character
        assert!(matches!(
            decode_wif("L5agPjZKceSTkhqZF2dmFptT5LFrbr6ZGPvP7u4A6dvhTrr71WZ8"),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }
}
