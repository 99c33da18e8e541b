//! # Cryptographic Primitives
//!
//! Thin, type-safe wrappers over audited implementations:
//!
//! - **Ed25519** for transaction signatures (`ed25519-dalek`).
//! - **SHA-256** and **BLAKE3** for derived signatures and addresses.
//! - **Base58check-style** addresses built from the two hashes.

pub mod address;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use address::AddressError;
pub use hash::{derived_signature, double_sha256, sha256};
pub use keys::Keypair;
pub use signatures::verify;
