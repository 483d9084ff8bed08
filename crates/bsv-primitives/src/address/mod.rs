//! Bitcoin P2PKH address handling.
//!
//! An address is `Base58Check(version || hash160(pubkey))`. The version byte
//! selects the network; the same network table drives WIF prefixes.

use std::fmt;
use std::str::FromStr;

use crate::base58;
use crate::PrimitivesError;

/// Length of a public key hash (Hash160) in bytes.
pub const PUBLIC_KEY_HASH_LEN: usize = 20;

/// Version bytes for one network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkParams {
    /// P2PKH address version byte.
    pub p2pkh_prefix: u8,
    /// WIF private key version byte.
    pub wif_prefix: u8,
}

/// Bitcoin network type for address and WIF prefix selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    /// Mainnet (address prefix 0x00, starts with '1'; WIF prefix 0x80).
    Mainnet,
    /// Testnet (address prefix 0x6f, starts with 'm' or 'n'; WIF prefix 0xef).
    Testnet,
}

impl Network {
    /// Every supported network, in lookup order.
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    /// Version bytes used by this network.
    pub const fn params(self) -> NetworkParams {
        match self {
            Network::Mainnet => NetworkParams {
                p2pkh_prefix: 0x00,
                wif_prefix: 0x80,
            },
            Network::Testnet => NetworkParams {
                p2pkh_prefix: 0x6f,
                wif_prefix: 0xef,
            },
        }
    }

    /// Find the network whose P2PKH version byte is `prefix`.
    pub fn from_p2pkh_prefix(prefix: u8) -> Option<Network> {
        Self::ALL
            .into_iter()
            .find(|n| n.params().p2pkh_prefix == prefix)
    }

    /// Find the network whose WIF version byte is `prefix`.
    pub fn from_wif_prefix(prefix: u8) -> Option<Network> {
        Self::ALL.into_iter().find(|n| n.params().wif_prefix == prefix)
    }
}

/// Encode a 20-byte public key hash as a P2PKH address for `network`.
pub fn encode_address(public_key_hash: &[u8; PUBLIC_KEY_HASH_LEN], network: Network) -> String {
    let mut payload = Vec::with_capacity(1 + PUBLIC_KEY_HASH_LEN);
    payload.push(network.params().p2pkh_prefix);
    payload.extend_from_slice(public_key_hash);
    base58::check_encode(&payload)
}

/// Decode a P2PKH address into its public key hash and network.
///
/// # Returns
/// `(hash160, network)`, `ChecksumMismatch` if the checksum is wrong, or
/// `InvalidAddress` for a wrong payload length or unknown version byte.
pub fn decode_address(
    address: &str,
) -> Result<([u8; PUBLIC_KEY_HASH_LEN], Network), PrimitivesError> {
    let payload = base58::check_decode(address)?;
    if payload.len() != 1 + PUBLIC_KEY_HASH_LEN {
        return Err(PrimitivesError::InvalidAddress(format!(
            "{} has a {} byte payload",
            address,
            payload.len()
        )));
    }
    let network = Network::from_p2pkh_prefix(payload[0]).ok_or_else(|| {
        PrimitivesError::InvalidAddress(format!(
            "{} has unknown prefix 0x{:02x}",
            address, payload[0]
        ))
    })?;
    let mut pkh = [0u8; PUBLIC_KEY_HASH_LEN];
    pkh.copy_from_slice(&payload[1..]);
    Ok((pkh, network))
}

/// Decode a P2PKH address and return only its public key hash.
pub fn address_to_public_key_hash(
    address: &str,
) -> Result<[u8; PUBLIC_KEY_HASH_LEN], PrimitivesError> {
    decode_address(address).map(|(pkh, _)| pkh)
}

/// Check whether `address` is a well-formed P2PKH address.
///
/// Never fails: any decode error yields `false`. When `network` is given,
/// the address must also belong to that network.
pub fn validate_address(address: &str, network: Option<Network>) -> bool {
    match decode_address(address) {
        Ok((_, decoded)) => network.map_or(true, |n| n == decoded),
        Err(_) => false,
    }
}

/// A Bitcoin P2PKH address.
///
/// Contains the 20-byte public key hash and the network it belongs to.
/// Can be serialized to/from the Base58Check string format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The human-readable Base58Check address string.
    pub address_string: String,
    /// The 20-byte RIPEMD-160(SHA-256(pubkey)) hash.
    pub public_key_hash: [u8; PUBLIC_KEY_HASH_LEN],
    /// The network this address belongs to.
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check-encoded address string.
    pub fn from_string(addr: &str) -> Result<Self, PrimitivesError> {
        let (public_key_hash, network) = decode_address(addr)?;
        Ok(Address {
            address_string: addr.to_string(),
            public_key_hash,
            network,
        })
    }

    /// Create an address from a 20-byte public key hash.
    pub fn from_public_key_hash(hash: &[u8; PUBLIC_KEY_HASH_LEN], network: Network) -> Self {
        Address {
            address_string: encode_address(hash, network),
            public_key_hash: *hash,
            network,
        }
    }
}

impl FromStr for Address {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address_string)
    }
}
