//! # Protocol Configuration & Constants
//!
//! Every wire length and size bound lives here, next to [`ChainParams`],
//! the set of activation timestamps that switch transaction formats and
//! rules on and off over the life of the chain.
//!
//! The constants are consensus-critical. Changing any of them changes the
//! byte layout of every transaction that uses them, which invalidates every
//! signature ever made over those bytes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Primitive Lengths
// ---------------------------------------------------------------------------

/// Big-endian `i32` on the wire.
pub const INT_LENGTH: usize = 4;

/// Big-endian `i64` on the wire.
pub const LONG_LENGTH: usize = 8;

/// Single byte booleans: 0 is false, 1 is true, any other byte fails to decode.
pub const BOOLEAN_LENGTH: usize = 1;

/// Timestamps are milliseconds since the Unix epoch, as `i64`.
pub const TIMESTAMP_LENGTH: usize = LONG_LENGTH;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// References are the signature of the sender's previous transaction.
pub const REFERENCE_LENGTH: usize = SIGNATURE_LENGTH;

/// Ed25519 public key length.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Raw (base58-decoded) address length: version + key hash + checksum.
pub const ADDRESS_LENGTH: usize = 25;

/// Default width of a fixed-point amount on the wire.
pub const AMOUNT_LENGTH: usize = 8;

/// Width of asset amounts inside payment entries.
pub const ASSET_AMOUNT_LENGTH: usize = 12;

/// Transaction type tag.
pub const TYPE_LENGTH: usize = INT_LENGTH;

/// Fees are always 8-byte amounts.
pub const FEE_LENGTH: usize = AMOUNT_LENGTH;

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Version byte of ordinary accounts. Encodes to a leading `Q`.
pub const ADDRESS_VERSION: u8 = 58;

/// Version byte of AT accounts. Encodes to a leading `A`.
pub const AT_ADDRESS_VERSION: u8 = 23;

/// Length of the key hash embedded in an address.
pub const ADDRESS_HASH_LENGTH: usize = 20;

/// Length of the trailing checksum in an address.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// The chain's native asset. Fees are always paid in it.
pub const NATIVE_ASSET_ID: u64 = 0;

/// Number of fractional digits in every amount.
pub const AMOUNT_DECIMALS: u32 = 8;

/// Asset names, in UTF-8 bytes.
pub const MAX_ASSET_NAME_SIZE: usize = 400;

/// Asset descriptions, in UTF-8 bytes.
pub const MAX_ASSET_DESCRIPTION_SIZE: usize = 4000;

/// Upper bound on an issued asset's quantity.
pub const MAX_ASSET_QUANTITY: i64 = 10_000_000_000;

/// Upper bound on the number of entries in a multi-payment.
pub const MAX_PAYMENTS_COUNT: usize = 400;

// ---------------------------------------------------------------------------
// Voting
// ---------------------------------------------------------------------------

/// Poll names and option names, in UTF-8 bytes.
pub const MAX_POLL_NAME_SIZE: usize = 400;

/// Poll descriptions, in UTF-8 bytes.
pub const MAX_POLL_DESCRIPTION_SIZE: usize = 4000;

/// Maximum number of options a poll may offer.
pub const MAX_POLL_OPTIONS: usize = 100;

// ---------------------------------------------------------------------------
// Automated Transactions
// ---------------------------------------------------------------------------

pub const MAX_AT_NAME_SIZE: usize = 200;
pub const MAX_AT_DESCRIPTION_SIZE: usize = 2000;
pub const MAX_AT_TYPE_SIZE: usize = 200;
pub const MAX_AT_TAGS_SIZE: usize = 200;

/// Upper bound on deploy-time creation bytes.
pub const MAX_AT_CREATION_BYTES_SIZE: usize = 4096;

/// Upper bound on the message carried by an AT settlement.
pub const MAX_AT_MESSAGE_SIZE: usize = 256;

// ---------------------------------------------------------------------------
// ChainParams
// ---------------------------------------------------------------------------

/// Errors raised while loading chain parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read chain params: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed chain params: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Activation points of protocol features, as transaction timestamps in
/// milliseconds.
///
/// A transaction dated before an activation point is judged, and
/// serialized, under the rules that were in force before it. Values default
/// to the main chain's history; test chains override them from JSON:
///
/// ```
/// use ledger_protocol::config::ChainParams;
///
/// let params = ChainParams::from_json_str(r#"{ "createPollV2Timestamp": 0 }"#).unwrap();
/// assert_eq!(params.create_poll_v2_timestamp, 0);
/// assert_eq!(params.issue_asset_v2_timestamp, ChainParams::default().issue_asset_v2_timestamp);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainParams {
    /// Poll creation and voting become valid.
    pub voting_release_timestamp: i64,
    /// Asset issuance, asset transfers and multi-payments become valid.
    pub assets_release_timestamp: i64,
    /// Automated Transactions may be deployed.
    pub at_release_timestamp: i64,
    /// Multi-payments check the fee against the sender's balance up front.
    pub powfix_release_timestamp: i64,
    /// Create-poll drops per-option voter counts and signs with its own tag.
    pub create_poll_v2_timestamp: i64,
    /// Issue-asset drops the embedded asset reference; multi-payment signs
    /// its full byte form.
    pub issue_asset_v2_timestamp: i64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            voting_release_timestamp: 1_403_715_600_000,
            assets_release_timestamp: 1_411_308_000_000,
            at_release_timestamp: 1_432_800_000_000,
            powfix_release_timestamp: 1_456_426_800_000,
            create_poll_v2_timestamp: 1_552_500_000_000,
            issue_asset_v2_timestamp: 1_552_500_000_000,
        }
    }
}

impl ChainParams {
    /// Every feature active from the epoch and every format at its latest
    /// version. Convenient for tests that are not about history.
    pub fn all_released() -> Self {
        Self {
            voting_release_timestamp: 0,
            assets_release_timestamp: 0,
            at_release_timestamp: 0,
            powfix_release_timestamp: 0,
            create_poll_v2_timestamp: 0,
            issue_asset_v2_timestamp: 0,
        }
    }

    /// Parse chain params from a JSON document. Missing keys keep their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load chain params from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// True if create-poll transactions at `timestamp` use the legacy layout.
    pub fn is_legacy_create_poll(&self, timestamp: i64) -> bool {
        timestamp < self.create_poll_v2_timestamp
    }

    /// True if issue-asset (and multi-payment signing) at `timestamp` use the
    /// legacy layout.
    pub fn is_legacy_issue_asset(&self, timestamp: i64) -> bool {
        timestamp < self.issue_asset_v2_timestamp
    }

    /// True if multi-payments at `timestamp` sign only their last payment.
    /// Shares its activation point with issue-asset v2.
    pub fn is_legacy_multi_payment(&self, timestamp: i64) -> bool {
        timestamp < self.issue_asset_v2_timestamp
    }

    pub fn is_voting_released(&self, timestamp: i64) -> bool {
        timestamp >= self.voting_release_timestamp
    }

    pub fn is_assets_released(&self, timestamp: i64) -> bool {
        timestamp >= self.assets_release_timestamp
    }

    pub fn is_at_released(&self, timestamp: i64) -> bool {
        timestamp >= self.at_release_timestamp
    }

    pub fn is_powfix_released(&self, timestamp: i64) -> bool {
        timestamp >= self.powfix_release_timestamp
    }
}
