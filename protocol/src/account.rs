//! # Accounts
//!
//! A thin view over the repository for one address. Accounts hold no state
//! of their own: every read and write goes through the repository handle
//! passed to the call, so the processing engine stays in control of which
//! store (and which uncommitted session) is touched.

use std::ops::Deref;

use crate::amount::Amount;
use crate::crypto::{address, signatures};
use crate::data::{PublicKey, Signature};
use crate::repository::{AccountRepository, DataResult};

/// An address on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
    address: String,
}

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn confirmed_balance<R>(&self, repository: &R, asset_id: u64) -> DataResult<Amount>
    where
        R: AccountRepository + ?Sized,
    {
        repository.confirmed_balance(&self.address, asset_id)
    }

    pub fn set_confirmed_balance<R>(&self, repository: &mut R, asset_id: u64, balance: Amount) -> DataResult<()>
    where
        R: AccountRepository + ?Sized,
    {
        repository.set_confirmed_balance(&self.address, asset_id, balance)
    }

    /// Add `delta` (which may be negative) to the confirmed balance.
    pub fn adjust_balance<R>(&self, repository: &mut R, asset_id: u64, delta: Amount) -> DataResult<()>
    where
        R: AccountRepository + ?Sized,
    {
        let balance = repository.confirmed_balance(&self.address, asset_id)?;
        repository.set_confirmed_balance(&self.address, asset_id, balance + delta)
    }

    pub fn last_reference<R>(&self, repository: &R) -> DataResult<Option<Signature>>
    where
        R: AccountRepository + ?Sized,
    {
        repository.last_reference(&self.address)
    }

    pub fn set_last_reference<R>(&self, repository: &mut R, reference: Option<Signature>) -> DataResult<()>
    where
        R: AccountRepository + ?Sized,
    {
        repository.set_last_reference(&self.address, reference)
    }
}

/// An account whose public key is known, so its signatures can be checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKeyAccount {
    account: Account,
    public_key: PublicKey,
}

impl PublicKeyAccount {
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            account: Account::new(address::from_public_key(&public_key)),
            public_key,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Check an Ed25519 signature made by this account over `message`.
    pub fn verify(&self, signature: &Signature, message: &[u8]) -> bool {
        signatures::verify(&self.public_key, signature.as_bytes(), message)
    }
}

impl Deref for PublicKeyAccount {
    type Target = Account;

    fn deref(&self) -> &Account {
        &self.account
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::repository::LedgerDb;

    #[test]
    fn balance_adjustments_go_through_the_repository() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        let account = Account::new(address::from_public_key(&[1; 32]));

        account.set_confirmed_balance(&mut session, 0, Amount::from_coins(100)).unwrap();
        account.adjust_balance(&mut session, 0, -Amount::from_coins(31)).unwrap();
        assert_eq!(account.confirmed_balance(&session, 0).unwrap(), Amount::from_coins(69));
        assert_eq!(account.confirmed_balance(&session, 5).unwrap(), Amount::ZERO);
    }

    #[test]
    fn reference_can_be_set_and_cleared() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut session = db.session();
        let account = Account::new(address::from_public_key(&[2; 32]));
        let sig = Signature::from_bytes([8; 64]);

        account.set_last_reference(&mut session, Some(sig)).unwrap();
        assert_eq!(account.last_reference(&session).unwrap(), Some(sig));
        account.set_last_reference(&mut session, None).unwrap();
        assert_eq!(account.last_reference(&session).unwrap(), None);
    }

    #[test]
    fn public_key_account_verifies_its_own_signatures() {
        let kp = Keypair::generate();
        let account = PublicKeyAccount::new(kp.public_key());
        assert_eq!(account.address(), kp.address());

        let sig = Signature::from_bytes(kp.sign(b"message"));
        assert!(account.verify(&sig, b"message"));
        assert!(!account.verify(&sig, b"other message"));

        let stranger = PublicKeyAccount::new(Keypair::generate().public_key());
        assert!(!stranger.verify(&sig, b"message"));
    }
}
