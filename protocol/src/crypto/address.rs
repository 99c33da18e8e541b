//! # Addresses
//!
//! An address is the public, checksummed identity of an account. It is
//! derived from a public key by one-way hashing, so an address can receive
//! funds long before anyone learns the key behind it.
//!
//! ```text
//! public_key (32 bytes)
//!     -> SHA-256 -> BLAKE3 -> first 20 bytes            = key hash
//!     version (1) || key hash (20)                      = body
//!     first 4 bytes of double-SHA-256(body)             = checksum
//!     base58(body || checksum)                          = address (25 raw bytes)
//! ```
//!
//! Ordinary accounts use [`ADDRESS_VERSION`]; AT accounts use
//! [`AT_ADDRESS_VERSION`] and hash a seed instead of a public key.

use thiserror::Error;

use super::hash::{blake3_hash, double_sha256, sha256};
use crate::config::{
    ADDRESS_CHECKSUM_LENGTH, ADDRESS_HASH_LENGTH, ADDRESS_LENGTH, ADDRESS_VERSION,
    AT_ADDRESS_VERSION,
};

/// Errors from converting between address strings and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is not valid base58: {0}")]
    Base58(String),

    #[error("invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("unknown address version byte {0}")]
    UnknownVersion(u8),

    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// Derive the address of an ordinary account from its public key.
pub fn from_public_key(public_key: &[u8]) -> String {
    let key_hash = blake3_hash(&sha256(public_key));
    encode_with_version(ADDRESS_VERSION, &key_hash[..ADDRESS_HASH_LENGTH])
}

/// Derive the address of an AT from a deployment seed.
pub fn at_address_from_seed(seed: &[u8]) -> String {
    let key_hash = blake3_hash(&sha256(seed));
    encode_with_version(AT_ADDRESS_VERSION, &key_hash[..ADDRESS_HASH_LENGTH])
}

fn encode_with_version(version: u8, key_hash: &[u8]) -> String {
    let mut raw = Vec::with_capacity(ADDRESS_LENGTH);
    raw.push(version);
    raw.extend_from_slice(key_hash);
    let checksum = double_sha256(&raw);
    raw.extend_from_slice(&checksum[..ADDRESS_CHECKSUM_LENGTH]);
    bs58::encode(raw).into_string()
}

/// Decode an address string into its 25 raw bytes, checking version and
/// checksum.
pub fn to_bytes(address: &str) -> Result<[u8; ADDRESS_LENGTH], AddressError> {
    let raw = bs58::decode(address)
        .into_vec()
        .map_err(|e| AddressError::Base58(e.to_string()))?;
    let raw: [u8; ADDRESS_LENGTH] =
        raw.as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength {
                expected: ADDRESS_LENGTH,
                got: raw.len(),
            })?;
    check_raw(&raw)?;
    Ok(raw)
}

/// Encode 25 raw bytes as an address string, checking version and checksum.
pub fn from_bytes(raw: &[u8; ADDRESS_LENGTH]) -> Result<String, AddressError> {
    check_raw(raw)?;
    Ok(bs58::encode(raw).into_string())
}

fn check_raw(raw: &[u8; ADDRESS_LENGTH]) -> Result<(), AddressError> {
    let version = raw[0];
    if version != ADDRESS_VERSION && version != AT_ADDRESS_VERSION {
        return Err(AddressError::UnknownVersion(version));
    }
    let body_len = ADDRESS_LENGTH - ADDRESS_CHECKSUM_LENGTH;
    let checksum = double_sha256(&raw[..body_len]);
    if raw[body_len..] != checksum[..ADDRESS_CHECKSUM_LENGTH] {
        return Err(AddressError::ChecksumMismatch);
    }
    Ok(())
}

/// True if `address` is a well-formed address of either kind.
pub fn is_valid(address: &str) -> bool {
    to_bytes(address).is_ok()
}

/// True if `address` is a well-formed AT address.
pub fn is_at_address(address: &str) -> bool {
    matches!(to_bytes(address), Ok(raw) if raw[0] == AT_ADDRESS_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    #[test]
    fn derived_addresses_are_valid() {
        let kp = Keypair::generate();
        let addr = from_public_key(&kp.public_key());
        assert!(is_valid(&addr));
        assert!(!is_at_address(&addr));
        assert!(addr.starts_with('Q'));
    }

    #[test]
    fn at_addresses_are_valid_and_distinct() {
        let at = at_address_from_seed(b"deploy");
        assert!(is_valid(&at));
        assert!(is_at_address(&at));
        assert!(at.starts_with('A'));
    }

    #[test]
    fn raw_bytes_roundtrip() {
        let addr = from_public_key(&[3u8; 32]);
        let raw = to_bytes(&addr).unwrap();
        assert_eq!(from_bytes(&raw).unwrap(), addr);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut raw = to_bytes(&from_public_key(&[1u8; 32])).unwrap();
        raw[24] ^= 0xFF;
        assert_eq!(from_bytes(&raw), Err(AddressError::ChecksumMismatch));
        assert!(!is_valid(&bs58::encode(raw).into_string()));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut raw = to_bytes(&from_public_key(&[1u8; 32])).unwrap();
        raw[0] = 1;
        assert_eq!(from_bytes(&raw), Err(AddressError::UnknownVersion(1)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(!is_valid(""));
        assert!(!is_valid("0OIl"));
        assert!(!is_valid("Qshort"));
    }
}
