//! # Key Management
//!
//! Ed25519 keypairs for the accounts that sign transactions.
//!
//! Only the signing side lives here. Verification is a free function in
//! [`super::signatures`] because verifiers only ever hold the 32-byte public
//! key that travels inside a transaction.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::fmt;

use super::address;
use crate::config::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// An account that can sign: an Ed25519 signing key plus the address it
/// controls.
///
/// `Keypair` intentionally does NOT implement `Serialize`. Exporting secret
/// key material has to be a deliberate call to
/// [`secret_key_bytes`](Self::secret_key_bytes).
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The raw public key, as it appears inside transactions.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The account address controlled by this keypair.
    pub fn address(&self) -> String {
        address::from_public_key(&self.public_key())
    }

    /// Sign a message. Ed25519 is deterministic: the same key and message
    /// always give the same signature.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Raw 32-byte secret key material.
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Public key as hex, the form used in display records.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material.
        write!(f, "Keypair(pub={})", self.public_key_hex())
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for Keypair {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_roundtrip() {
        let kp = Keypair::generate();
        let restored = Keypair::from_seed(&kp.secret_key_bytes());
        assert_eq!(kp, restored);
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = Keypair::from_seed(&[7u8; 32]);
        assert_eq!(kp.sign(b"message"), kp.sign(b"message"));
        assert_ne!(kp.sign(b"message"), kp.sign(b"other"));
    }

    #[test]
    fn debug_hides_secret() {
        let kp = Keypair::from_seed(&[9u8; 32]);
        let debug = format!("{:?}", kp);
        assert!(debug.contains(&kp.public_key_hex()));
        assert!(!debug.contains(&hex::encode(kp.secret_key_bytes())));
    }

    #[test]
    fn address_matches_public_key() {
        let kp = Keypair::generate();
        assert_eq!(kp.address(), address::from_public_key(&kp.public_key()));
    }
}
