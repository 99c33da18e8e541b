//! AT settlement: a system-generated transaction moving funds out of an
//! AT account.
//!
//! The AT account plays the sender. It has no key, so the transaction's
//! signature is derived from its content, but the reference chain is
//! enforced exactly as for signed senders.

use super::validation::{ensure, ValidationResult};
use super::{reference_matches, TransactionError};
use crate::account::Account;
use crate::amount::Amount;
use crate::config::{MAX_AT_MESSAGE_SIZE, NATIVE_ASSET_ID};
use crate::crypto::address;
use crate::data::transaction::AtTransactionData;
use crate::data::Signature;
use crate::repository::{DataResult, Repository};

pub(super) fn is_valid<R: Repository + ?Sized>(
    data: &AtTransactionData,
    repository: &R,
) -> DataResult<ValidationResult> {
    let at_account = Account::new(data.at_address.as_str());
    ensure!(
        reference_matches(repository, &at_account, &data.base.reference)?,
        ValidationResult::InvalidReference
    );
    ensure!(
        data.message.len() <= MAX_AT_MESSAGE_SIZE,
        ValidationResult::InvalidDataLength
    );

    let payment = match data.payment {
        Some(payment) => payment,
        None => return Ok(ValidationResult::Ok),
    };
    ensure!(!payment.amount.is_negative(), ValidationResult::NegativeAmount);
    ensure!(address::is_valid(&data.recipient), ValidationResult::InvalidAddress);

    if payment.asset_id != NATIVE_ASSET_ID {
        let asset = match repository.fetch_asset(payment.asset_id)? {
            Some(asset) => asset,
            None => return Ok(ValidationResult::AssetDoesNotExist),
        };
        ensure!(
            asset.is_divisible || payment.amount.is_integral(),
            ValidationResult::InvalidAmount
        );
    }

    ensure!(
        at_account.confirmed_balance(repository, payment.asset_id)? >= payment.amount,
        ValidationResult::NoBalance
    );
    Ok(ValidationResult::Ok)
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut AtTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let at_account = Account::new(data.at_address.as_str());
    at_account.set_last_reference(repository, Some(signature))?;

    if let Some(payment) = data.payment {
        let recipient = Account::new(data.recipient.as_str());
        at_account.adjust_balance(repository, payment.asset_id, -payment.amount)?;
        recipient.adjust_balance(repository, payment.asset_id, payment.amount)?;

        if payment.asset_id == NATIVE_ASSET_ID && recipient.last_reference(repository)?.is_none() {
            recipient.set_last_reference(repository, Some(signature))?;
        }
    }
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut AtTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let at_account = Account::new(data.at_address.as_str());

    if let Some(payment) = data.payment {
        let recipient = Account::new(data.recipient.as_str());
        recipient.adjust_balance(repository, payment.asset_id, -payment.amount)?;
        at_account.adjust_balance(repository, payment.asset_id, payment.amount)?;

        if payment.asset_id == NATIVE_ASSET_ID
            && recipient.last_reference(repository)? == Some(signature)
        {
            recipient.set_last_reference(repository, None)?;
        }
    }

    at_account.set_last_reference(repository, Some(data.base.reference))?;
    Ok(())
}

/// The AT is charged its fee through its state record; the fee is still
/// reported here so balance history adds up.
pub(super) fn amount_for(data: &AtTransactionData, address: &str) -> Option<Amount> {
    let native = data
        .payment
        .filter(|p| p.asset_id == NATIVE_ASSET_ID)
        .map_or(Amount::ZERO, |p| p.amount);

    let mut amount = Amount::ZERO;
    if address == data.at_address {
        amount = amount.checked_sub(data.base.fee.checked_add(native)?)?;
    }
    if address == data.recipient {
        amount = amount.checked_add(native)?;
    }
    Some(amount)
}
