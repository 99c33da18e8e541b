//! Validation outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of a consensus rule check.
///
/// This is an expected outcome, not an error: a transaction that breaks a
/// rule gets the variant naming that rule, and callers branch on it before
/// processing. Storage failures are reported separately as
/// [`TransactionError`](super::TransactionError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationResult {
    Ok,
    InvalidAddress,
    NegativeAmount,
    NegativeFee,
    NoBalance,
    InvalidReference,
    InvalidNameLength,
    InvalidAmount,
    NameNotLowerCase,
    InvalidDescriptionLength,
    InvalidOptionsCount,
    InvalidOptionLength,
    DuplicateOption,
    PollAlreadyExists,
    PollDoesNotExist,
    PollOptionDoesNotExist,
    AlreadyVotedForThatOption,
    InvalidDataLength,
    InvalidQuantity,
    AssetDoesNotExist,
    AssetAlreadyExists,
    InvalidPaymentsCount,
    InvalidTagsLength,
    InvalidAtTypeLength,
    InvalidCreationBytes,
    NotYetReleased,
}

impl ValidationResult {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::NegativeFee => "NEGATIVE_FEE",
            Self::NoBalance => "NO_BALANCE",
            Self::InvalidReference => "INVALID_REFERENCE",
            Self::InvalidNameLength => "INVALID_NAME_LENGTH",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::NameNotLowerCase => "NAME_NOT_LOWER_CASE",
            Self::InvalidDescriptionLength => "INVALID_DESCRIPTION_LENGTH",
            Self::InvalidOptionsCount => "INVALID_OPTIONS_COUNT",
            Self::InvalidOptionLength => "INVALID_OPTION_LENGTH",
            Self::DuplicateOption => "DUPLICATE_OPTION",
            Self::PollAlreadyExists => "POLL_ALREADY_EXISTS",
            Self::PollDoesNotExist => "POLL_DOES_NOT_EXIST",
            Self::PollOptionDoesNotExist => "POLL_OPTION_DOES_NOT_EXIST",
            Self::AlreadyVotedForThatOption => "ALREADY_VOTED_FOR_THAT_OPTION",
            Self::InvalidDataLength => "INVALID_DATA_LENGTH",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::AssetDoesNotExist => "ASSET_DOES_NOT_EXIST",
            Self::AssetAlreadyExists => "ASSET_ALREADY_EXISTS",
            Self::InvalidPaymentsCount => "INVALID_PAYMENTS_COUNT",
            Self::InvalidTagsLength => "INVALID_TAGS_LENGTH",
            Self::InvalidAtTypeLength => "INVALID_AT_TYPE_LENGTH",
            Self::InvalidCreationBytes => "INVALID_CREATION_BYTES",
            Self::NotYetReleased => "NOT_YET_RELEASED",
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return early from a validator with `$result` unless `$cond` holds.
macro_rules! ensure {
    ($cond:expr, $result:expr) => {
        if !$cond {
            return Ok($result);
        }
    };
}

pub(crate) use ensure;
