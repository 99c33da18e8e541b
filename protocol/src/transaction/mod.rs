//! # Transaction Processing
//!
//! Consensus rules and ledger mutation for every supported transaction
//! type.
//!
//! ## Architecture
//!
//! ```text
//! mod.rs:           Transaction: lifecycle state machine and dispatch
//! validation.rs:    ValidationResult
//! payments.rs:      shared payment checks and balance moves
//! signing.rs:       signing and signature verification
//! <type>.rs:        one module per transaction type
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! Unvalidated --is_valid(OK)--> Valid --process--> Processed --orphan--> Orphaned
//!                                 ^                                         |
//!                                 +----------------is_valid(OK)-------------+
//! ```
//!
//! `is_valid` only reads the repository. `process` and `orphan` write
//! through the repository handle they are given; the caller owns the
//! enclosing storage session and discards it if any call fails.

mod at;
mod create_poll;
mod deploy_at;
mod genesis;
mod issue_asset;
mod multi_payment;
mod payment;
mod payments;
pub mod signing;
mod transfer_asset;
pub mod validation;
mod vote_on_poll;

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::account::Account;
use crate::amount::Amount;
use crate::config::ChainParams;
use crate::data::{Signature, TransactionData, TransactionType};
use crate::repository::{DataError, DataResult, Repository};
use crate::transform::TransformationError;

pub use signing::{is_signature_valid, sign, with_derived_signature};
pub use validation::ValidationResult;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures of the processing engine. Rule violations are not errors; they
/// come back as a [`ValidationResult`].
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The repository failed. Fatal to the block being applied.
    #[error("repository failure: {0}")]
    Data(#[from] DataError),

    #[error("transformation failure: {0}")]
    Transformation(#[from] TransformationError),

    #[error("cannot {operation} a transaction that is {state}")]
    IllegalTransition {
        operation: &'static str,
        state: TransactionState,
    },

    #[error("{0} transaction is not signed")]
    Unsigned(TransactionType),

    #[error("{0} transaction is already signed")]
    AlreadySigned(TransactionType),

    #[error("{0} transactions carry a derived signature, not a key signature")]
    NotKeySigned(TransactionType),

    #[error("keypair does not match the transaction's creator public key")]
    KeyMismatch,

    #[error("{0} transaction amounts overflow")]
    AmountOverflow(TransactionType),

    /// A stored record is missing a field that processing derives.
    #[error("{transaction_type} record has no {field}; it was never processed")]
    MissingProcessingState {
        transaction_type: TransactionType,
        field: &'static str,
    },
}

// ---------------------------------------------------------------------------
// TransactionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    Unvalidated,
    Valid,
    Processed,
    Orphaned,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unvalidated => write!(f, "unvalidated"),
            Self::Valid => write!(f, "valid"),
            Self::Processed => write!(f, "processed"),
            Self::Orphaned => write!(f, "orphaned"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transaction record together with where it is in its lifecycle.
#[derive(Debug, Clone)]
pub struct Transaction {
    data: TransactionData,
    state: TransactionState,
}

impl Transaction {
    /// Wrap a freshly received or created record.
    pub fn new(data: TransactionData) -> Self {
        Self {
            data,
            state: TransactionState::Unvalidated,
        }
    }

    /// Wrap a record loaded from storage that is currently applied to the
    /// ledger, so that it can be orphaned.
    pub fn from_processed(data: TransactionData) -> Self {
        Self {
            data,
            state: TransactionState::Processed,
        }
    }

    pub fn data(&self) -> &TransactionData {
        &self.data
    }

    pub fn into_data(self) -> TransactionData {
        self.data
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.data.transaction_type()
    }

    fn require(&self, operation: &'static str, allowed: &[TransactionState]) -> Result<(), TransactionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TransactionError::IllegalTransition {
                operation,
                state: self.state,
            })
        }
    }

    fn signature(&self) -> Result<Signature, TransactionError> {
        self.data
            .signature()
            .ok_or(TransactionError::Unsigned(self.transaction_type()))
    }

    /// Check the transaction against the current ledger state.
    ///
    /// Never writes to the repository. An `Ok` verdict moves the
    /// transaction to `Valid`; any other verdict leaves it `Unvalidated`.
    pub fn is_valid<R: Repository + ?Sized>(
        &mut self,
        repository: &R,
        params: &ChainParams,
    ) -> Result<ValidationResult, TransactionError> {
        self.require(
            "validate",
            &[
                TransactionState::Unvalidated,
                TransactionState::Valid,
                TransactionState::Orphaned,
            ],
        )?;

        let result = match &self.data {
            TransactionData::Genesis(d) => genesis::is_valid(d),
            TransactionData::Payment(d) => payment::is_valid(d, repository)?,
            TransactionData::CreatePoll(d) => create_poll::is_valid(d, repository, params)?,
            TransactionData::VoteOnPoll(d) => vote_on_poll::is_valid(d, repository, params)?,
            TransactionData::IssueAsset(d) => issue_asset::is_valid(d, repository, params)?,
            TransactionData::TransferAsset(d) => transfer_asset::is_valid(d, repository, params)?,
            TransactionData::MultiPayment(d) => multi_payment::is_valid(d, repository, params)?,
            TransactionData::DeployAt(d) => deploy_at::is_valid(d, repository, params)?,
            TransactionData::At(d) => at::is_valid(d, repository)?,
        };

        if result.is_ok() {
            self.state = TransactionState::Valid;
        } else {
            debug!(
                transaction_type = %self.transaction_type(),
                %result,
                "transaction failed validation"
            );
            self.state = TransactionState::Unvalidated;
        }
        Ok(result)
    }

    /// Apply the transaction to the ledger and store the record.
    ///
    /// Fields derived while processing (issued asset id, AT address,
    /// previous vote) are filled in before the record is stored.
    pub fn process<R: Repository + ?Sized>(
        &mut self,
        repository: &mut R,
        params: &ChainParams,
    ) -> Result<(), TransactionError> {
        self.require("process", &[TransactionState::Valid])?;
        let signature = self.signature()?;

        match &mut self.data {
            TransactionData::Genesis(d) => genesis::process(d, repository, signature)?,
            TransactionData::Payment(d) => payment::process(d, repository, signature)?,
            TransactionData::CreatePoll(d) => create_poll::process(d, repository, signature)?,
            TransactionData::VoteOnPoll(d) => vote_on_poll::process(d, repository, signature)?,
            TransactionData::IssueAsset(d) => issue_asset::process(d, repository, signature)?,
            TransactionData::TransferAsset(d) => transfer_asset::process(d, repository, signature)?,
            TransactionData::MultiPayment(d) => multi_payment::process(d, repository, signature)?,
            TransactionData::DeployAt(d) => deploy_at::process(d, repository, params, signature)?,
            TransactionData::At(d) => at::process(d, repository, signature)?,
        }
        repository.save_transaction(&self.data)?;

        self.state = TransactionState::Processed;
        info!(
            transaction_type = %self.transaction_type(),
            signature = %signature,
            "processed transaction"
        );
        Ok(())
    }

    /// Undo [`process`](Self::process): delete the record and reverse every
    /// balance and reference change.
    pub fn orphan<R: Repository + ?Sized>(
        &mut self,
        repository: &mut R,
        params: &ChainParams,
    ) -> Result<(), TransactionError> {
        self.require("orphan", &[TransactionState::Processed])?;
        let signature = self.signature()?;

        repository.delete_transaction(&self.data)?;
        match &mut self.data {
            TransactionData::Genesis(d) => genesis::orphan(d, repository)?,
            TransactionData::Payment(d) => payment::orphan(d, repository, signature)?,
            TransactionData::CreatePoll(d) => create_poll::orphan(d, repository)?,
            TransactionData::VoteOnPoll(d) => vote_on_poll::orphan(d, repository)?,
            TransactionData::IssueAsset(d) => issue_asset::orphan(d, repository)?,
            TransactionData::TransferAsset(d) => transfer_asset::orphan(d, repository, signature)?,
            TransactionData::MultiPayment(d) => multi_payment::orphan(d, repository, signature)?,
            TransactionData::DeployAt(d) => deploy_at::orphan(d, repository, params)?,
            TransactionData::At(d) => at::orphan(d, repository, signature)?,
        }

        self.state = TransactionState::Orphaned;
        info!(
            transaction_type = %self.transaction_type(),
            signature = %signature,
            "orphaned transaction"
        );
        Ok(())
    }

    /// Net effect of this transaction on `address`'s native balance.
    ///
    /// Fails with [`TransactionError::AmountOverflow`] when the fee and
    /// amounts of a decodable but never valid record do not fit an `i64`.
    pub fn amount_for(&self, address: &str) -> Result<Amount, TransactionError> {
        let amount = match &self.data {
            TransactionData::Genesis(d) => genesis::amount_for(d, address),
            TransactionData::Payment(d) => payment::amount_for(d, address),
            TransactionData::CreatePoll(d) => creator_fee_for(&self.data, d.base.fee, address),
            TransactionData::VoteOnPoll(d) => creator_fee_for(&self.data, d.base.fee, address),
            TransactionData::IssueAsset(d) => creator_fee_for(&self.data, d.base.fee, address),
            TransactionData::TransferAsset(d) => transfer_asset::amount_for(d, address),
            TransactionData::MultiPayment(d) => multi_payment::amount_for(d, address),
            TransactionData::DeployAt(d) => deploy_at::amount_for(d, address),
            TransactionData::At(d) => at::amount_for(d, address),
        };
        amount.ok_or(TransactionError::AmountOverflow(self.transaction_type()))
    }

    /// Every counterparty besides the creator.
    pub fn recipient_addresses(&self) -> Vec<String> {
        match &self.data {
            TransactionData::Genesis(d) => vec![d.recipient.clone()],
            TransactionData::Payment(d) => vec![d.recipient.clone()],
            TransactionData::CreatePoll(d) => vec![d.owner.clone()],
            TransactionData::VoteOnPoll(_) => Vec::new(),
            TransactionData::IssueAsset(d) => vec![d.owner.clone()],
            TransactionData::TransferAsset(d) => vec![d.recipient.clone()],
            TransactionData::MultiPayment(d) => payments::recipients(&d.payments),
            TransactionData::DeployAt(d) => d.at_address.iter().cloned().collect(),
            TransactionData::At(d) => vec![d.recipient.clone()],
        }
    }

    /// True if `address` created this transaction or is one of its
    /// recipients. For AT settlements the AT account counts as the creator.
    pub fn is_involved(&self, address: &str) -> bool {
        self.data.creator_address().as_deref() == Some(address)
            || self.recipient_addresses().iter().any(|r| r == address)
    }

    /// Verify the signature over the signing bytes.
    pub fn is_signature_valid(&self, params: &ChainParams) -> Result<bool, TransactionError> {
        signing::is_signature_valid(&self.data, params)
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by the per-type modules
// ---------------------------------------------------------------------------

/// True if `account`'s last reference is exactly `reference`.
fn reference_matches<R: Repository + ?Sized>(
    repository: &R,
    account: &Account,
    reference: &Signature,
) -> DataResult<bool> {
    Ok(account.last_reference(repository)?.as_ref() == Some(reference))
}

/// True if `account` can pay `cost` in the native asset.
fn can_afford<R: Repository + ?Sized>(repository: &R, account: &Account, cost: Amount) -> DataResult<bool> {
    Ok(account.confirmed_balance(repository, crate::config::NATIVE_ASSET_ID)? >= cost)
}

/// Byte length of a string field in the range `1..=max`.
fn length_within(s: &str, max: usize) -> bool {
    (1..=max).contains(&s.len())
}

/// Native-balance effect of a transaction whose only cost is its fee.
fn creator_fee_for(data: &TransactionData, fee: Amount, address: &str) -> Option<Amount> {
    if data.creator_address().as_deref() == Some(address) {
        Amount::ZERO.checked_sub(fee)
    } else {
        Some(Amount::ZERO)
    }
}
