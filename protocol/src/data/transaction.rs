//! Transaction records, one variant per supported transaction type.
//!
//! Records are plain data: they know their fields and nothing about how
//! they are encoded or what they do to the ledger. Once a signature is
//! attached it cannot be replaced; re-signing means building a new record.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{PaymentData, PollOptionData, PublicKey, Signature};
use crate::amount::Amount;
use crate::crypto::address;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Wire type tag of a transaction.
///
/// The numbering is fixed by historical chain data. Only some tags have a
/// codec in this crate; see [`TransactionType::is_supported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionType {
    Genesis = 1,
    Payment = 2,
    RegisterName = 3,
    UpdateName = 4,
    SellName = 5,
    CancelSellName = 6,
    BuyName = 7,
    CreatePoll = 8,
    VoteOnPoll = 9,
    Arbitrary = 10,
    IssueAsset = 11,
    TransferAsset = 12,
    CreateAssetOrder = 13,
    CancelAssetOrder = 14,
    MultiPayment = 15,
    DeployAt = 16,
    Message = 17,
    At = 18,
}

impl TransactionType {
    pub const ALL: [TransactionType; 18] = [
        Self::Genesis,
        Self::Payment,
        Self::RegisterName,
        Self::UpdateName,
        Self::SellName,
        Self::CancelSellName,
        Self::BuyName,
        Self::CreatePoll,
        Self::VoteOnPoll,
        Self::Arbitrary,
        Self::IssueAsset,
        Self::TransferAsset,
        Self::CreateAssetOrder,
        Self::CancelAssetOrder,
        Self::MultiPayment,
        Self::DeployAt,
        Self::Message,
        Self::At,
    ];

    /// The 4-byte tag written at the start of every encoded transaction.
    pub const fn value(self) -> i32 {
        self as i32
    }

    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.value() == value)
    }

    /// Whether this crate can decode, encode and process the type.
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Genesis
                | Self::Payment
                | Self::CreatePoll
                | Self::VoteOnPoll
                | Self::IssueAsset
                | Self::TransferAsset
                | Self::MultiPayment
                | Self::DeployAt
                | Self::At
        )
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Genesis => "GENESIS",
            Self::Payment => "PAYMENT",
            Self::RegisterName => "REGISTER_NAME",
            Self::UpdateName => "UPDATE_NAME",
            Self::SellName => "SELL_NAME",
            Self::CancelSellName => "CANCEL_SELL_NAME",
            Self::BuyName => "BUY_NAME",
            Self::CreatePoll => "CREATE_POLL",
            Self::VoteOnPoll => "VOTE_ON_POLL",
            Self::Arbitrary => "ARBITRARY",
            Self::IssueAsset => "ISSUE_ASSET",
            Self::TransferAsset => "TRANSFER_ASSET",
            Self::CreateAssetOrder => "CREATE_ASSET_ORDER",
            Self::CancelAssetOrder => "CANCEL_ASSET_ORDER",
            Self::MultiPayment => "MULTIPAYMENT",
            Self::DeployAt => "DEPLOY_AT",
            Self::Message => "MESSAGE",
            Self::At => "AT",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Common fields
// ---------------------------------------------------------------------------

/// Fields shared by every non-genesis transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBase {
    pub timestamp: i64,
    /// Signature of the sender's previous transaction.
    pub reference: Signature,
    pub fee: Amount,
    signature: Option<Signature>,
}

impl TransactionBase {
    /// Common fields of a record that has not been signed yet.
    pub fn new(timestamp: i64, reference: Signature, fee: Amount) -> Self {
        Self {
            timestamp,
            reference,
            fee,
            signature: None,
        }
    }

    pub(crate) fn with_optional_signature(
        timestamp: i64,
        reference: Signature,
        fee: Amount,
        signature: Option<Signature>,
    ) -> Self {
        Self {
            timestamp,
            reference,
            fee,
            signature,
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Per-type payloads
// ---------------------------------------------------------------------------

/// Initial allocation of native coins. Has no sender, reference or fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisTransactionData {
    pub timestamp: i64,
    pub recipient: String,
    pub amount: Amount,
}

/// Native-asset transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTransactionData {
    pub base: TransactionBase,
    pub sender_public_key: PublicKey,
    pub recipient: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePollTransactionData {
    pub base: TransactionBase,
    pub creator_public_key: PublicKey,
    pub owner: String,
    pub poll_name: String,
    pub description: String,
    pub poll_options: Vec<PollOptionData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOnPollTransactionData {
    pub base: TransactionBase,
    pub voter_public_key: PublicKey,
    pub poll_name: String,
    pub option_index: i32,
    /// The voter's option before this vote, filled in by processing so that
    /// orphaning can restore it. Not part of the wire bytes.
    pub previous_option_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAssetTransactionData {
    pub base: TransactionBase,
    pub issuer_public_key: PublicKey,
    pub owner: String,
    pub asset_name: String,
    pub description: String,
    pub quantity: i64,
    pub is_divisible: bool,
    /// Allocated by processing. Not part of the wire bytes.
    pub asset_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAssetTransactionData {
    pub base: TransactionBase,
    pub sender_public_key: PublicKey,
    pub recipient: String,
    pub asset_id: u64,
    pub amount: Amount,
}

impl TransferAssetTransactionData {
    /// The transfer as a single payment leg.
    pub fn payment(&self) -> PaymentData {
        PaymentData::new(self.recipient.clone(), self.asset_id, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPaymentTransactionData {
    pub base: TransactionBase,
    pub sender_public_key: PublicKey,
    pub payments: Vec<PaymentData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployAtTransactionData {
    pub base: TransactionBase,
    pub creator_public_key: PublicKey,
    pub name: String,
    pub description: String,
    pub at_type: String,
    pub tags: String,
    pub creation_bytes: Vec<u8>,
    /// Initial funding moved from the creator to the AT account.
    pub amount: Amount,
    /// Derived by processing. Not part of the wire bytes.
    pub at_address: Option<String>,
}

/// Asset movement carried by an AT settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtPayment {
    pub asset_id: u64,
    pub amount: Amount,
}

/// Settlement produced by an AT's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtTransactionData {
    pub base: TransactionBase,
    pub at_address: String,
    pub recipient: String,
    pub payment: Option<AtPayment>,
    pub message: Vec<u8>,
}

// ---------------------------------------------------------------------------
// TransactionData
// ---------------------------------------------------------------------------

/// A transaction of any supported type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    Genesis(GenesisTransactionData),
    Payment(PaymentTransactionData),
    CreatePoll(CreatePollTransactionData),
    VoteOnPoll(VoteOnPollTransactionData),
    IssueAsset(IssueAssetTransactionData),
    TransferAsset(TransferAssetTransactionData),
    MultiPayment(MultiPaymentTransactionData),
    DeployAt(DeployAtTransactionData),
    At(AtTransactionData),
}

impl TransactionData {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Genesis(_) => TransactionType::Genesis,
            Self::Payment(_) => TransactionType::Payment,
            Self::CreatePoll(_) => TransactionType::CreatePoll,
            Self::VoteOnPoll(_) => TransactionType::VoteOnPoll,
            Self::IssueAsset(_) => TransactionType::IssueAsset,
            Self::TransferAsset(_) => TransactionType::TransferAsset,
            Self::MultiPayment(_) => TransactionType::MultiPayment,
            Self::DeployAt(_) => TransactionType::DeployAt,
            Self::At(_) => TransactionType::At,
        }
    }

    /// Common fields, absent only for genesis.
    pub fn base(&self) -> Option<&TransactionBase> {
        match self {
            Self::Genesis(_) => None,
            Self::Payment(d) => Some(&d.base),
            Self::CreatePoll(d) => Some(&d.base),
            Self::VoteOnPoll(d) => Some(&d.base),
            Self::IssueAsset(d) => Some(&d.base),
            Self::TransferAsset(d) => Some(&d.base),
            Self::MultiPayment(d) => Some(&d.base),
            Self::DeployAt(d) => Some(&d.base),
            Self::At(d) => Some(&d.base),
        }
    }

    fn base_mut(&mut self) -> Option<&mut TransactionBase> {
        match self {
            Self::Genesis(_) => None,
            Self::Payment(d) => Some(&mut d.base),
            Self::CreatePoll(d) => Some(&mut d.base),
            Self::VoteOnPoll(d) => Some(&mut d.base),
            Self::IssueAsset(d) => Some(&mut d.base),
            Self::TransferAsset(d) => Some(&mut d.base),
            Self::MultiPayment(d) => Some(&mut d.base),
            Self::DeployAt(d) => Some(&mut d.base),
            Self::At(d) => Some(&mut d.base),
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Genesis(g) => g.timestamp,
            other => other.base().map_or(0, |b| b.timestamp),
        }
    }

    pub fn reference(&self) -> Option<&Signature> {
        self.base().map(|b| &b.reference)
    }

    /// Fee in native coins; genesis is free.
    pub fn fee(&self) -> Amount {
        self.base().map_or(Amount::ZERO, |b| b.fee)
    }

    /// The signature carried by the record.
    ///
    /// Genesis records never carry one on the wire; their signature is
    /// derived from their bytes, see
    /// [`GenesisTransactionData::signature`].
    pub fn signature(&self) -> Option<Signature> {
        match self {
            Self::Genesis(g) => g.signature(),
            other => other.base().and_then(|b| b.signature().copied()),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature().is_some()
    }

    /// Public key of the account that created and signed the transaction.
    pub fn creator_public_key(&self) -> Option<&PublicKey> {
        match self {
            Self::Genesis(_) | Self::At(_) => None,
            Self::Payment(d) => Some(&d.sender_public_key),
            Self::CreatePoll(d) => Some(&d.creator_public_key),
            Self::VoteOnPoll(d) => Some(&d.voter_public_key),
            Self::IssueAsset(d) => Some(&d.issuer_public_key),
            Self::TransferAsset(d) => Some(&d.sender_public_key),
            Self::MultiPayment(d) => Some(&d.sender_public_key),
            Self::DeployAt(d) => Some(&d.creator_public_key),
        }
    }

    /// Address whose last reference this transaction consumes.
    ///
    /// For AT settlements that is the AT account itself.
    pub fn creator_address(&self) -> Option<String> {
        match self {
            Self::Genesis(_) => None,
            Self::At(d) => Some(d.at_address.clone()),
            other => other.creator_public_key().map(|k| address::from_public_key(k)),
        }
    }

    /// Attach a signature to an unsigned record.
    pub(crate) fn with_signature(mut self, signature: Signature) -> Self {
        if let Some(base) = self.base_mut() {
            base.signature = Some(signature);
        }
        self
    }

    /// Copy of the record with its signature removed.
    pub(crate) fn without_signature(&self) -> Self {
        let mut unsigned = self.clone();
        if let Some(base) = unsigned.base_mut() {
            base.signature = None;
        }
        unsigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_follow_legacy_numbering() {
        assert_eq!(TransactionType::Genesis.value(), 1);
        assert_eq!(TransactionType::RegisterName.value(), 3);
        assert_eq!(TransactionType::CreatePoll.value(), 8);
        assert_eq!(TransactionType::MultiPayment.value(), 15);
        assert_eq!(TransactionType::At.value(), 18);
        for t in TransactionType::ALL {
            assert_eq!(TransactionType::from_value(t.value()), Some(t));
        }
    }

    #[test]
    fn unknown_tags_map_to_none() {
        assert_eq!(TransactionType::from_value(0), None);
        assert_eq!(TransactionType::from_value(19), None);
        assert_eq!(TransactionType::from_value(-1), None);
    }

    #[test]
    fn name_types_are_not_supported() {
        assert!(!TransactionType::RegisterName.is_supported());
        assert!(!TransactionType::Message.is_supported());
        assert!(TransactionType::At.is_supported());
    }

    #[test]
    fn signature_is_set_once_through_with_signature() {
        let base = TransactionBase::new(1_000, Signature::from_bytes([1; 64]), Amount::from_coins(1));
        let data = TransactionData::Payment(PaymentTransactionData {
            base,
            sender_public_key: [2; 32],
            recipient: address::from_public_key(&[3; 32]),
            amount: Amount::from_coins(5),
        });
        assert!(!data.is_signed());

        let signed = data.with_signature(Signature::from_bytes([9; 64]));
        assert_eq!(signed.signature(), Some(Signature::from_bytes([9; 64])));
        assert!(!signed.without_signature().is_signed());
    }

    #[test]
    fn genesis_signature_is_derived_from_its_bytes() {
        let genesis = GenesisTransactionData {
            timestamp: 0,
            recipient: address::from_public_key(&[7; 32]),
            amount: Amount::from_coins(100),
        };
        let derived = genesis.signature();
        assert!(derived.is_some());

        let data = TransactionData::Genesis(genesis);
        assert_eq!(data.signature(), derived);
        assert!(data.is_signed());
    }

    #[test]
    fn at_creator_is_the_at_account() {
        let at_address = address::at_address_from_seed(b"at");
        let data = TransactionData::At(AtTransactionData {
            base: TransactionBase::new(5, Signature::from_bytes([0; 64]), Amount::ZERO),
            at_address: at_address.clone(),
            recipient: address::from_public_key(&[4; 32]),
            payment: None,
            message: vec![],
        });
        assert_eq!(data.creator_address(), Some(at_address));
        assert!(data.creator_public_key().is_none());
    }
}
