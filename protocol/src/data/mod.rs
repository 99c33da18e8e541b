//! # Data Model
//!
//! Plain records that flow between the wire codecs, the processing engine
//! and the repository. Nothing in here touches storage or knows about
//! consensus rules.
//!
//! ```text
//! transaction.rs: TransactionData, one variant per transaction type
//! payment.rs:     PaymentData, the (recipient, asset, amount) triple
//! asset.rs:       AssetData, issued asset metadata
//! voting.rs:      PollData, PollOptionData, VoteOnPollData
//! at.rs:          ATData and ATStateData, deployed AT bookkeeping
//! ```

pub mod asset;
pub mod at;
pub mod payment;
pub mod transaction;
pub mod voting;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

pub use asset::AssetData;
pub use at::{AtData, AtStateData};
pub use payment::PaymentData;
pub use transaction::{TransactionData, TransactionType};
pub use voting::{PollData, PollOptionData, VoteOnPollData};

/// A raw Ed25519 public key as carried inside transactions.
pub type PublicKey = [u8; PUBLIC_KEY_LENGTH];

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 64-byte transaction signature.
///
/// Signatures double as transaction identifiers and as the `reference`
/// that chains an account's transactions together, so the same type is
/// used for both.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns `None` unless `slice` is exactly 64 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        slice.try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn from_base58(s: &str) -> Option<Self> {
        let bytes = bs58::decode(s).into_vec().ok()?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b58 = self.to_base58();
        write!(f, "Signature({}…)", &b58[..b58.len().min(12)])
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        Self::from_slice(&bytes).ok_or_else(|| {
            D::Error::custom(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_base58_roundtrip() {
        let sig = Signature::from_bytes([0xAB; 64]);
        assert_eq!(Signature::from_base58(&sig.to_base58()), Some(sig));
    }

    #[test]
    fn signature_rejects_wrong_length() {
        assert!(Signature::from_slice(&[0u8; 63]).is_none());
        assert!(Signature::from_base58(&bs58::encode([1u8; 32]).into_string()).is_none());
    }

    #[test]
    fn signature_bincode_roundtrip() {
        let sig = Signature::from_bytes([7; 64]);
        let bytes = bincode::serialize(&sig).unwrap();
        let back: Signature = bincode::deserialize(&bytes).unwrap();
        assert_eq!(sig, back);
    }
}
