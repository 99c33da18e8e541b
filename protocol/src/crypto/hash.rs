//! # Hashing Utilities
//!
//! Two hash functions, each with a fixed job:
//!
//! - **SHA-256**: derived signatures of system-generated transactions
//!   (genesis and AT settlements), address checksums (as double SHA-256),
//!   and the first stage of address key hashing.
//! - **BLAKE3**: the second stage of address key hashing and derived AT
//!   addresses.
//!
//! All of these feed consensus-visible bytes, so neither may be swapped out
//! without a protocol version gate.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute the BLAKE3 hash of the input data.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// 64-byte signature for a transaction that nobody signs.
///
/// Genesis and AT settlement transactions have no private key behind them,
/// yet other accounts chain off their signature as a last reference. Their
/// signature is the SHA-256 of their bytes, repeated to fill 64 bytes.
pub fn derived_signature(bytes: &[u8]) -> [u8; 64] {
    let digest = sha256(bytes);
    let mut signature = [0u8; 64];
    signature[..32].copy_from_slice(&digest);
    signature[32..].copy_from_slice(&digest);
    signature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(sha256(b"").as_slice(), expected.as_slice());
    }

    #[test]
    fn double_sha256_is_sha256_of_sha256() {
        let single = sha256(b"ledger");
        assert_eq!(double_sha256(b"ledger"), sha256(&single));
        assert_ne!(double_sha256(b"ledger"), single);
    }

    #[test]
    fn blake3_differs_from_sha256() {
        assert_ne!(blake3_hash(b"ledger"), sha256(b"ledger"));
    }

    #[test]
    fn derived_signature_repeats_digest() {
        let sig = derived_signature(b"genesis");
        assert_eq!(sig[..32], sig[32..]);
        assert_eq!(sig[..32], sha256(b"genesis"));
    }
}
