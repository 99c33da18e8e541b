//! Ledger-level records of deployed Automated Transactions.
//!
//! The AT virtual machine is not part of this crate. These records are what
//! the ledger keeps about each AT: its code and lifecycle flags, and one
//! opaque state snapshot per block height at which it ran.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// One deployed AT, keyed by its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtData {
    pub at_address: String,
    /// Address of the account that deployed it.
    pub creator: String,
    /// Deployment timestamp, milliseconds.
    pub creation: i64,
    pub version: i16,
    pub code_bytes: Vec<u8>,
    pub is_sleeping: bool,
    pub sleep_until_height: Option<u32>,
    pub is_finished: bool,
    pub had_fatal_error: bool,
    pub is_frozen: bool,
    pub frozen_balance: Option<Amount>,
}

impl AtData {
    /// A freshly deployed AT: awake, running, not frozen.
    pub fn deployed(
        at_address: String,
        creator: String,
        creation: i64,
        version: i16,
        code_bytes: Vec<u8>,
    ) -> Self {
        Self {
            at_address,
            creator,
            creation,
            version,
            code_bytes,
            is_sleeping: false,
            sleep_until_height: None,
            is_finished: false,
            had_fatal_error: false,
            is_frozen: false,
            frozen_balance: None,
        }
    }
}

/// Execution snapshot of one AT at one block height.
///
/// History is append-only per height. Rows disappear only when their height
/// is orphaned or their AT is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtStateData {
    pub at_address: String,
    pub height: u32,
    /// Timestamp the state was produced at; orders states within a height.
    pub creation: i64,
    pub state_data: Vec<u8>,
    pub state_hash: Vec<u8>,
    /// Fees the AT was charged at this height.
    pub fees: Amount,
}
