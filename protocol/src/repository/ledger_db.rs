//! # LedgerDb: sled-backed repository
//!
//! All ledger records live in a single sled tree, namespaced by key prefix.
//! Values are bincode-encoded records.
//!
//! | Prefix        | Key suffix                   | Value                  |
//! |---------------|------------------------------|------------------------|
//! | `tx/`         | signature (64B)              | `bincode(TransactionData)` |
//! | `balance/`    | address `\0` asset id (8B BE) | `bincode(Amount)`     |
//! | `reference/`  | address                      | `bincode(Signature)`   |
//! | `asset/`      | asset id (8B BE)             | `bincode(AssetData)`   |
//! | `asset-name/` | asset name                   | asset id (8B BE)       |
//! | `at/`         | address                      | `bincode(AtData)`      |
//! | `at-state/`   | address `\0` height (4B BE)  | `bincode(AtStateData)` |
//! | `at-height/`  | height (4B BE) address       | empty (index)          |
//! | `poll/`       | poll name                    | `bincode(PollData)`    |
//! | `vote/`       | poll name `\0` voter key     | `bincode(VoteOnPollData)` |
//!
//! Integers are big-endian so that sled's lexicographic order matches
//! numeric order. Base58 never produces a zero byte, so `\0` is a safe
//! separator after an address.
//!
//! ## Atomicity
//!
//! Writes never touch sled directly. They accumulate in a
//! [`LedgerSession`] overlay that reads see immediately, and are applied
//! as one sled `Batch` on [`LedgerSession::commit`]. Dropping the session
//! instead discards them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Batch, Db, Tree};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use super::{
    AccountRepository, AssetRepository, AtRepository, DataError, DataResult, PollRepository,
    TransactionRepository,
};
use crate::amount::Amount;
use crate::config::NATIVE_ASSET_ID;
use crate::data::{
    AssetData, AtData, AtStateData, PollData, PublicKey, Signature, TransactionData,
    VoteOnPollData,
};

const LEDGER_TREE: &str = "ledger";

const TX_PREFIX: &[u8] = b"tx/";
const BALANCE_PREFIX: &[u8] = b"balance/";
const REFERENCE_PREFIX: &[u8] = b"reference/";
const ASSET_PREFIX: &[u8] = b"asset/";
const ASSET_NAME_PREFIX: &[u8] = b"asset-name/";
const AT_PREFIX: &[u8] = b"at/";
const AT_STATE_PREFIX: &[u8] = b"at-state/";
const AT_HEIGHT_PREFIX: &[u8] = b"at-height/";
const POLL_PREFIX: &[u8] = b"poll/";
const VOTE_PREFIX: &[u8] = b"vote/";

const SEPARATOR: u8 = 0;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

fn key(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut k = Vec::with_capacity(prefix.len() + suffix.len());
    k.extend_from_slice(prefix);
    k.extend_from_slice(suffix);
    k
}

fn compound_key(prefix: &[u8], first: &[u8], second: &[u8]) -> Vec<u8> {
    let mut k = Vec::with_capacity(prefix.len() + first.len() + 1 + second.len());
    k.extend_from_slice(prefix);
    k.extend_from_slice(first);
    k.push(SEPARATOR);
    k.extend_from_slice(second);
    k
}

fn balance_key(address: &str, asset_id: u64) -> Vec<u8> {
    compound_key(BALANCE_PREFIX, address.as_bytes(), &asset_id.to_be_bytes())
}

fn at_state_key(at_address: &str, height: u32) -> Vec<u8> {
    compound_key(AT_STATE_PREFIX, at_address.as_bytes(), &height.to_be_bytes())
}

fn at_height_key(height: u32, at_address: &str) -> Vec<u8> {
    key(AT_HEIGHT_PREFIX, &[&height.to_be_bytes()[..], at_address.as_bytes()].concat())
}

fn vote_key(poll_name: &str, voter_public_key: &PublicKey) -> Vec<u8> {
    compound_key(VOTE_PREFIX, poll_name.as_bytes(), voter_public_key)
}

fn encode<T: Serialize>(value: &T) -> DataResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DataError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> DataResult<T> {
    bincode::deserialize(bytes).map_err(|e| DataError::Corrupt {
        key: hex::encode(key),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Persistent ledger storage.
///
/// Cheap to clone; clones share the same sled handles.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    ledger: Tree,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A database that is deleted when dropped. Meant for tests.
    pub fn open_temporary() -> DataResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DataResult<Self> {
        let ledger = db.open_tree(LEDGER_TREE)?;
        Ok(Self { db, ledger })
    }

    /// Start a write session. Nothing it writes is visible to other
    /// sessions until it is committed.
    pub fn session(&self) -> LedgerSession<'_> {
        LedgerSession {
            db: self,
            pending: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LedgerSession
// ---------------------------------------------------------------------------

/// Write overlay over a [`LedgerDb`].
///
/// `None` in the overlay marks a pending delete.
#[derive(Debug)]
pub struct LedgerSession<'db> {
    db: &'db LedgerDb,
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'db> LedgerSession<'db> {
    /// Apply every pending write in one atomic batch and flush.
    pub fn commit(self) -> DataResult<()> {
        let writes = self.pending.len();
        let mut batch = Batch::default();
        for (k, v) in self.pending {
            match v {
                Some(v) => batch.insert(k, v),
                None => batch.remove(k),
            }
        }
        if let Err(e) = self.db.ledger.apply_batch(batch) {
            warn!(error = %e, writes, "ledger batch commit failed");
            return Err(e.into());
        }
        self.db.db.flush()?;
        debug!(writes, "ledger session committed");
        Ok(())
    }

    /// Discard every pending write.
    pub fn rollback(self) {
        debug!(writes = self.pending.len(), "ledger session rolled back");
    }

    /// Number of keys written or deleted so far.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    // -- raw access ---------------------------------------------------------

    fn get(&self, key: &[u8]) -> DataResult<Option<Vec<u8>>> {
        if let Some(pending) = self.pending.get(key) {
            return Ok(pending.clone());
        }
        Ok(self.db.ledger.get(key)?.map(|v| v.to_vec()))
    }

    fn contains(&self, key: &[u8]) -> DataResult<bool> {
        if let Some(pending) = self.pending.get(key) {
            return Ok(pending.is_some());
        }
        Ok(self.db.ledger.contains_key(key)?)
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.pending.insert(key, Some(value));
    }

    fn remove(&mut self, key: Vec<u8>) {
        self.pending.insert(key, None);
    }

    /// Committed and pending entries under `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> DataResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        for item in self.db.ledger.scan_prefix(prefix) {
            let (k, v) = item?;
            merged.insert(k.to_vec(), v.to_vec());
        }
        let overlay = self
            .pending
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix));
        for (k, v) in overlay {
            match v {
                Some(v) => {
                    merged.insert(k.clone(), v.clone());
                }
                None => {
                    merged.remove(k);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }

    fn get_record<T: DeserializeOwned>(&self, key: &[u8]) -> DataResult<Option<T>> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    fn put_record<T: Serialize>(&mut self, key: Vec<u8>, value: &T) -> DataResult<()> {
        let bytes = encode(value)?;
        self.put(key, bytes);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store implementations
// ---------------------------------------------------------------------------

fn transaction_key(data: &TransactionData) -> DataResult<Vec<u8>> {
    let signature = data
        .signature()
        .ok_or_else(|| DataError::Unsigned(data.transaction_type().to_string()))?;
    Ok(key(TX_PREFIX, signature.as_bytes()))
}

impl TransactionRepository for LedgerSession<'_> {
    fn fetch_transaction(&self, signature: &Signature) -> DataResult<Option<TransactionData>> {
        self.get_record(&key(TX_PREFIX, signature.as_bytes()))
    }

    fn save_transaction(&mut self, data: &TransactionData) -> DataResult<()> {
        let k = transaction_key(data)?;
        self.put_record(k, data)
    }

    fn delete_transaction(&mut self, data: &TransactionData) -> DataResult<()> {
        let k = transaction_key(data)?;
        self.remove(k);
        Ok(())
    }
}

impl AccountRepository for LedgerSession<'_> {
    fn confirmed_balance(&self, address: &str, asset_id: u64) -> DataResult<Amount> {
        Ok(self
            .get_record(&balance_key(address, asset_id))?
            .unwrap_or(Amount::ZERO))
    }

    fn set_confirmed_balance(&mut self, address: &str, asset_id: u64, balance: Amount) -> DataResult<()> {
        self.put_record(balance_key(address, asset_id), &balance)
    }

    fn delete_balance(&mut self, address: &str, asset_id: u64) -> DataResult<()> {
        self.remove(balance_key(address, asset_id));
        Ok(())
    }

    fn last_reference(&self, address: &str) -> DataResult<Option<Signature>> {
        self.get_record(&key(REFERENCE_PREFIX, address.as_bytes()))
    }

    fn set_last_reference(&mut self, address: &str, reference: Option<Signature>) -> DataResult<()> {
        let k = key(REFERENCE_PREFIX, address.as_bytes());
        match reference {
            Some(reference) => self.put_record(k, &reference),
            None => {
                self.remove(k);
                Ok(())
            }
        }
    }
}

impl AssetRepository for LedgerSession<'_> {
    fn fetch_asset(&self, asset_id: u64) -> DataResult<Option<AssetData>> {
        self.get_record(&key(ASSET_PREFIX, &asset_id.to_be_bytes()))
    }

    fn asset_name_exists(&self, name: &str) -> DataResult<bool> {
        self.contains(&key(ASSET_NAME_PREFIX, name.as_bytes()))
    }

    fn next_asset_id(&self) -> DataResult<u64> {
        let mut highest = NATIVE_ASSET_ID;
        for (k, _) in self.scan_prefix(ASSET_PREFIX)? {
            let id_bytes: [u8; 8] = k[ASSET_PREFIX.len()..]
                .try_into()
                .map_err(|_| DataError::Corrupt {
                    key: hex::encode(&k),
                    reason: "asset key is not an 8-byte id".to_string(),
                })?;
            highest = highest.max(u64::from_be_bytes(id_bytes));
        }
        Ok(highest + 1)
    }

    fn save_asset(&mut self, asset: &AssetData) -> DataResult<()> {
        let id = asset.asset_id.to_be_bytes();
        self.put(key(ASSET_NAME_PREFIX, asset.name.as_bytes()), id.to_vec());
        self.put_record(key(ASSET_PREFIX, &id), asset)
    }

    fn delete_asset(&mut self, asset_id: u64) -> DataResult<()> {
        if let Some(asset) = self.fetch_asset(asset_id)? {
            self.remove(key(ASSET_NAME_PREFIX, asset.name.as_bytes()));
        }
        self.remove(key(ASSET_PREFIX, &asset_id.to_be_bytes()));
        Ok(())
    }
}

impl AtRepository for LedgerSession<'_> {
    fn fetch_at(&self, at_address: &str) -> DataResult<Option<AtData>> {
        self.get_record(&key(AT_PREFIX, at_address.as_bytes()))
    }

    fn save_at(&mut self, at: &AtData) -> DataResult<()> {
        self.put_record(key(AT_PREFIX, at.at_address.as_bytes()), at)
    }

    fn delete_at(&mut self, at_address: &str) -> DataResult<()> {
        let prefix = compound_key(AT_STATE_PREFIX, at_address.as_bytes(), &[]);
        let states = self.scan_prefix(&prefix)?;
        let cascaded = states.len();
        for (k, v) in states {
            let state: AtStateData = decode(&k, &v)?;
            self.remove(at_height_key(state.height, at_address));
            self.remove(k);
        }
        self.remove(key(AT_PREFIX, at_address.as_bytes()));
        debug!(at_address, cascaded, "deleted AT and its states");
        Ok(())
    }

    fn fetch_at_state(&self, at_address: &str, height: u32) -> DataResult<Option<AtStateData>> {
        self.get_record(&at_state_key(at_address, height))
    }

    fn save_at_state(&mut self, state: &AtStateData) -> DataResult<()> {
        self.put(at_height_key(state.height, &state.at_address), Vec::new());
        self.put_record(at_state_key(&state.at_address, state.height), state)
    }

    fn delete_at_state(&mut self, at_address: &str, height: u32) -> DataResult<()> {
        self.remove(at_height_key(height, at_address));
        self.remove(at_state_key(at_address, height));
        Ok(())
    }

    fn at_states_at_height(&self, height: u32) -> DataResult<Vec<AtStateData>> {
        let prefix = key(AT_HEIGHT_PREFIX, &height.to_be_bytes());
        let mut states = Vec::new();
        for (k, _) in self.scan_prefix(&prefix)? {
            let at_address = std::str::from_utf8(&k[prefix.len()..]).map_err(|e| DataError::Corrupt {
                key: hex::encode(&k),
                reason: e.to_string(),
            })?;
            let state_key = at_state_key(at_address, height);
            let state = self
                .get_record::<AtStateData>(&state_key)?
                .ok_or_else(|| DataError::Corrupt {
                    key: hex::encode(&k),
                    reason: "height index points at a missing AT state".to_string(),
                })?;
            states.push(state);
        }
        states.sort_by(|a, b| {
            a.creation
                .cmp(&b.creation)
                .then_with(|| a.at_address.cmp(&b.at_address))
        });
        Ok(states)
    }

    fn delete_at_states_at_height(&mut self, height: u32) -> DataResult<()> {
        for state in self.at_states_at_height(height)? {
            self.delete_at_state(&state.at_address, height)?;
        }
        Ok(())
    }
}

impl PollRepository for LedgerSession<'_> {
    fn fetch_poll(&self, poll_name: &str) -> DataResult<Option<PollData>> {
        self.get_record(&key(POLL_PREFIX, poll_name.as_bytes()))
    }

    fn save_poll(&mut self, poll: &PollData) -> DataResult<()> {
        self.put_record(key(POLL_PREFIX, poll.poll_name.as_bytes()), poll)
    }

    fn delete_poll(&mut self, poll_name: &str) -> DataResult<()> {
        let votes = compound_key(VOTE_PREFIX, poll_name.as_bytes(), &[]);
        for (k, _) in self.scan_prefix(&votes)? {
            self.remove(k);
        }
        self.remove(key(POLL_PREFIX, poll_name.as_bytes()));
        Ok(())
    }

    fn fetch_vote(&self, poll_name: &str, voter_public_key: &PublicKey) -> DataResult<Option<VoteOnPollData>> {
        self.get_record(&vote_key(poll_name, voter_public_key))
    }

    fn save_vote(&mut self, vote: &VoteOnPollData) -> DataResult<()> {
        self.put_record(vote_key(&vote.poll_name, &vote.voter_public_key), vote)
    }

    fn delete_vote(&mut self, poll_name: &str, voter_public_key: &PublicKey) -> DataResult<()> {
        self.remove(vote_key(poll_name, voter_public_key));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::address;

    fn addr(seed: u8) -> String {
        address::from_public_key(&[seed; 32])
    }

    fn at_state(at_address: &str, height: u32, creation: i64) -> AtStateData {
        AtStateData {
            at_address: at_address.to_string(),
            height,
            creation,
            state_data: vec![height as u8; 4],
            state_hash: vec![0xEE; 32],
            fees: Amount::from_units(1_000),
        }
    }

    fn asset(asset_id: u64, name: &str) -> AssetData {
        AssetData {
            asset_id,
            owner: addr(1),
            name: name.to_string(),
            description: "test asset".to_string(),
            quantity: 1_000,
            is_divisible: false,
            reference: Signature::from_bytes([asset_id as u8; 64]),
        }
    }

    #[test]
    fn open_temporary_database() {
        let db = LedgerDb::open_temporary().expect("should create temp db");
        assert!(db.is_empty());
    }

    #[test]
    fn unset_balance_reads_as_zero() {
        let db = LedgerDb::open_temporary().unwrap();
        let session = db.session();
        assert_eq!(session.confirmed_balance(&addr(1), 0).unwrap(), Amount::ZERO);
        assert_eq!(session.last_reference(&addr(1)).unwrap(), None);
    }

    #[test]
    fn committed_writes_are_visible_to_later_sessions() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        session.set_confirmed_balance(&addr(1), 0, Amount::from_coins(10)).unwrap();
        session
            .set_last_reference(&addr(1), Some(Signature::from_bytes([5; 64])))
            .unwrap();
        assert_eq!(session.pending_writes(), 2);
        session.commit().unwrap();

        let session = db.session();
        assert_eq!(session.confirmed_balance(&addr(1), 0).unwrap(), Amount::from_coins(10));
        assert_eq!(
            session.last_reference(&addr(1)).unwrap(),
            Some(Signature::from_bytes([5; 64]))
        );
    }

    #[test]
    fn rolled_back_writes_leave_no_trace() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        session.set_confirmed_balance(&addr(2), 0, Amount::from_coins(3)).unwrap();
        assert_eq!(session.confirmed_balance(&addr(2), 0).unwrap(), Amount::from_coins(3));
        session.rollback();

        assert!(db.is_empty());
        assert_eq!(db.session().confirmed_balance(&addr(2), 0).unwrap(), Amount::ZERO);
    }

    #[test]
    fn clearing_a_reference_removes_it() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        session
            .set_last_reference(&addr(3), Some(Signature::from_bytes([1; 64])))
            .unwrap();
        session.commit().unwrap();

        let mut session = db.session();
        session.set_last_reference(&addr(3), None).unwrap();
        assert_eq!(session.last_reference(&addr(3)).unwrap(), None);
        session.commit().unwrap();
        assert!(db.is_empty());
    }

    #[test]
    fn next_asset_id_follows_highest_stored_id() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        assert_eq!(session.next_asset_id().unwrap(), 1);

        session.save_asset(&asset(1, "gold")).unwrap();
        session.save_asset(&asset(7, "silver")).unwrap();
        assert_eq!(session.next_asset_id().unwrap(), 8);
        assert!(session.asset_name_exists("gold").unwrap());

        session.delete_asset(7).unwrap();
        assert_eq!(session.next_asset_id().unwrap(), 2);
        assert!(!session.asset_name_exists("silver").unwrap());
        assert!(!session.asset_exists(7).unwrap());
    }

    #[test]
    fn pending_deletes_hide_committed_rows_in_scans() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        session.save_asset(&asset(3, "copper")).unwrap();
        session.commit().unwrap();

        let mut session = db.session();
        session.delete_asset(3).unwrap();
        assert_eq!(session.next_asset_id().unwrap(), 1);
    }

    #[test]
    fn deleting_an_at_cascades_to_every_height() {
        let db = LedgerDb::open_temporary().unwrap();
        let at_address = address::at_address_from_seed(b"cascade");
        let other = address::at_address_from_seed(b"other");

        let mut session = db.session();
        session
            .save_at(&AtData::deployed(at_address.clone(), addr(1), 10, 1, vec![1, 2, 3]))
            .unwrap();
        for height in 1..=3 {
            session.save_at_state(&at_state(&at_address, height, 100 + height as i64)).unwrap();
        }
        session.save_at_state(&at_state(&other, 2, 50)).unwrap();
        session.commit().unwrap();

        let mut session = db.session();
        session.delete_at(&at_address).unwrap();
        session.commit().unwrap();

        let session = db.session();
        assert!(session.fetch_at(&at_address).unwrap().is_none());
        for height in 1..=3 {
            assert!(session.fetch_at_state(&at_address, height).unwrap().is_none());
        }
        let remaining = session.at_states_at_height(2).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].at_address, other);
    }

    #[test]
    fn states_at_height_are_ordered_by_creation() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        let a = address::at_address_from_seed(b"a");
        let b = address::at_address_from_seed(b"b");
        let c = address::at_address_from_seed(b"c");
        session.save_at_state(&at_state(&a, 9, 300)).unwrap();
        session.save_at_state(&at_state(&b, 9, 100)).unwrap();
        session.save_at_state(&at_state(&c, 9, 200)).unwrap();
        session.save_at_state(&at_state(&c, 10, 1)).unwrap();

        let creations: Vec<i64> = session
            .at_states_at_height(9)
            .unwrap()
            .iter()
            .map(|s| s.creation)
            .collect();
        assert_eq!(creations, vec![100, 200, 300]);

        session.delete_at_states_at_height(9).unwrap();
        assert!(session.at_states_at_height(9).unwrap().is_empty());
        assert_eq!(session.at_states_at_height(10).unwrap().len(), 1);
    }

    #[test]
    fn deleting_a_poll_drops_its_votes() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        let poll = PollData {
            creator_public_key: [1; 32],
            owner: addr(1),
            poll_name: "colour".to_string(),
            description: "favourite colour".to_string(),
            poll_options: vec![],
            published: 1,
        };
        session.save_poll(&poll).unwrap();
        session
            .save_vote(&VoteOnPollData {
                poll_name: "colour".to_string(),
                voter_public_key: [2; 32],
                option_index: 0,
            })
            .unwrap();
        session.commit().unwrap();

        let mut session = db.session();
        session.delete_poll("colour").unwrap();
        assert!(!session.poll_exists("colour").unwrap());
        assert!(session.fetch_vote("colour", &[2; 32]).unwrap().is_none());
    }

    #[test]
    fn reopened_database_keeps_committed_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let db = LedgerDb::open(dir.path()).unwrap();
            let mut session = db.session();
            session.set_confirmed_balance(&addr(9), 4, Amount::from_coins(2)).unwrap();
            session.commit().unwrap();
        }
        let db = LedgerDb::open(dir.path()).unwrap();
        assert_eq!(db.session().confirmed_balance(&addr(9), 4).unwrap(), Amount::from_coins(2));
    }
}
