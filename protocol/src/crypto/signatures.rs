//! # Digital Signatures
//!
//! Ed25519 verification against raw public keys carried inside
//! transactions.
//!
//! Verification never errors: malformed keys, wrong lengths and bad
//! signatures all collapse to `false`, because the caller only needs a
//! verdict.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Verify an Ed25519 signature against a raw public key and message.
pub fn verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    verifying_key
        .verify(message, &Signature::from_bytes(&sig_bytes))
        .is_ok()
}
