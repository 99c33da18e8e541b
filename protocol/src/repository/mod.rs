//! # Repository
//!
//! The storage contract consumed by the processing engine, and a sled-backed
//! implementation of it.
//!
//! ```text
//! mod.rs:       store traits, DataError
//! ledger_db.rs: LedgerDb (sled) and LedgerSession (atomic write overlay)
//! ```
//!
//! Reads take `&self` and writes take `&mut self`. Validation only ever
//! receives a shared reference, so it cannot mutate ledger state.
//!
//! Every write performed while applying a block lands in one
//! [`LedgerSession`]. The block driver commits the session when the whole
//! block applied cleanly and drops it otherwise, which is how a storage
//! fault halfway through `process` leaves no partial state behind.

pub mod ledger_db;

use thiserror::Error;

use crate::amount::Amount;
use crate::data::{AssetData, AtData, AtStateData, PollData, PublicKey, Signature, TransactionData, VoteOnPollData};

pub use ledger_db::{LedgerDb, LedgerSession};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Storage failures. Always fatal to the block being applied.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt record under key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("cannot store an unsigned {0} transaction")]
    Unsigned(String),
}

pub type DataResult<T> = Result<T, DataError>;

// ---------------------------------------------------------------------------
// Store traits
// ---------------------------------------------------------------------------

pub trait TransactionRepository {
    fn fetch_transaction(&self, signature: &Signature) -> DataResult<Option<TransactionData>>;

    /// Store a signed record under its signature, replacing any previous copy.
    fn save_transaction(&mut self, data: &TransactionData) -> DataResult<()>;

    fn delete_transaction(&mut self, data: &TransactionData) -> DataResult<()>;
}

/// Per-address balances and last references.
pub trait AccountRepository {
    /// Confirmed balance of `address` in `asset_id`; zero if never set.
    fn confirmed_balance(&self, address: &str, asset_id: u64) -> DataResult<Amount>;

    fn set_confirmed_balance(&mut self, address: &str, asset_id: u64, balance: Amount) -> DataResult<()>;

    /// Forget the balance row entirely.
    fn delete_balance(&mut self, address: &str, asset_id: u64) -> DataResult<()>;

    fn last_reference(&self, address: &str) -> DataResult<Option<Signature>>;

    /// `None` clears the reference.
    fn set_last_reference(&mut self, address: &str, reference: Option<Signature>) -> DataResult<()>;
}

pub trait AssetRepository {
    fn fetch_asset(&self, asset_id: u64) -> DataResult<Option<AssetData>>;

    fn asset_exists(&self, asset_id: u64) -> DataResult<bool> {
        Ok(self.fetch_asset(asset_id)?.is_some())
    }

    fn asset_name_exists(&self, name: &str) -> DataResult<bool>;

    /// Id the next issued asset will receive.
    fn next_asset_id(&self) -> DataResult<u64>;

    fn save_asset(&mut self, asset: &AssetData) -> DataResult<()>;

    fn delete_asset(&mut self, asset_id: u64) -> DataResult<()>;
}

/// Deployed ATs and their per-height state history.
pub trait AtRepository {
    fn fetch_at(&self, at_address: &str) -> DataResult<Option<AtData>>;

    fn save_at(&mut self, at: &AtData) -> DataResult<()>;

    /// Delete an AT together with all of its states at every height.
    fn delete_at(&mut self, at_address: &str) -> DataResult<()>;

    fn fetch_at_state(&self, at_address: &str, height: u32) -> DataResult<Option<AtStateData>>;

    fn save_at_state(&mut self, state: &AtStateData) -> DataResult<()>;

    fn delete_at_state(&mut self, at_address: &str, height: u32) -> DataResult<()>;

    /// All AT states recorded at `height`, oldest `creation` first.
    fn at_states_at_height(&self, height: u32) -> DataResult<Vec<AtStateData>>;

    fn delete_at_states_at_height(&mut self, height: u32) -> DataResult<()>;
}

pub trait PollRepository {
    fn fetch_poll(&self, poll_name: &str) -> DataResult<Option<PollData>>;

    fn poll_exists(&self, poll_name: &str) -> DataResult<bool> {
        Ok(self.fetch_poll(poll_name)?.is_some())
    }

    fn save_poll(&mut self, poll: &PollData) -> DataResult<()>;

    fn delete_poll(&mut self, poll_name: &str) -> DataResult<()>;

    fn fetch_vote(&self, poll_name: &str, voter_public_key: &PublicKey) -> DataResult<Option<VoteOnPollData>>;

    fn save_vote(&mut self, vote: &VoteOnPollData) -> DataResult<()>;

    fn delete_vote(&mut self, poll_name: &str, voter_public_key: &PublicKey) -> DataResult<()>;
}

/// Everything the processing engine needs from storage.
pub trait Repository:
    TransactionRepository + AccountRepository + AssetRepository + AtRepository + PollRepository
{
}

impl<T> Repository for T where
    T: TransactionRepository + AccountRepository + AssetRepository + AtRepository + PollRepository
{
}
