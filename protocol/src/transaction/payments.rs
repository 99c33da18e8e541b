//! The payment routine shared by every payment-bearing transaction type.
//!
//! A payment-bearing transaction reduces to "sender pays a fee and a list
//! of legs".

use std::collections::BTreeMap;

use super::validation::{ensure, ValidationResult};
use crate::account::Account;
use crate::amount::Amount;
use crate::config::NATIVE_ASSET_ID;
use crate::crypto::address;
use crate::data::{PaymentData, Signature};
use crate::repository::{DataResult, Repository};

/// Check `payments` from `sender`, who also pays `fee` in the native asset.
pub(super) fn is_valid<R: Repository + ?Sized>(
    repository: &R,
    sender: &Account,
    payments: &[PaymentData],
    fee: Amount,
) -> DataResult<ValidationResult> {
    ensure!(fee.is_positive(), ValidationResult::NegativeFee);

    let mut totals: BTreeMap<u64, Amount> = BTreeMap::new();
    totals.insert(NATIVE_ASSET_ID, fee);

    for payment in payments {
        ensure!(payment.amount.is_positive(), ValidationResult::NegativeAmount);
        ensure!(address::is_valid(&payment.recipient), ValidationResult::InvalidAddress);

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

        let total = totals.entry(payment.asset_id).or_insert(Amount::ZERO);
        *total = match total.checked_add(payment.amount) {
            Some(sum) => sum,
            None => return Ok(ValidationResult::InvalidAmount),
        };
    }

    for (asset_id, total) in totals {
        ensure!(
            sender.confirmed_balance(repository, asset_id)? >= total,
            ValidationResult::NoBalance
        );
    }
    Ok(ValidationResult::Ok)
}

/// Charge the fee, move every leg and advance the sender's reference.
pub(super) fn process<R: Repository + ?Sized>(
    repository: &mut R,
    sender: &Account,
    payments: &[PaymentData],
    fee: Amount,
    signature: Signature,
) -> DataResult<()> {
    sender.adjust_balance(repository, NATIVE_ASSET_ID, -fee)?;
    sender.set_last_reference(repository, Some(signature))?;

    for payment in payments {
        let recipient = Account::new(payment.recipient.as_str());
        sender.adjust_balance(repository, payment.asset_id, -payment.amount)?;
        recipient.adjust_balance(repository, payment.asset_id, payment.amount)?;

        if payment.asset_id == NATIVE_ASSET_ID && recipient.last_reference(repository)?.is_none() {
            recipient.set_last_reference(repository, Some(signature))?;
        }
    }
    Ok(())
}

/// Exact inverse of [`process`]. `reference` is the sender's reference
/// before the transaction.
pub(super) fn orphan<R: Repository + ?Sized>(
    repository: &mut R,
    sender: &Account,
    payments: &[PaymentData],
    fee: Amount,
    signature: Signature,
    reference: Signature,
) -> DataResult<()> {
    for payment in payments.iter().rev() {
        let recipient = Account::new(payment.recipient.as_str());
        recipient.adjust_balance(repository, payment.asset_id, -payment.amount)?;
        sender.adjust_balance(repository, payment.asset_id, payment.amount)?;

        if payment.asset_id == NATIVE_ASSET_ID
            && recipient.last_reference(repository)? == Some(signature)
        {
            recipient.set_last_reference(repository, None)?;
        }
    }

    sender.set_last_reference(repository, Some(reference))?;
    sender.adjust_balance(repository, NATIVE_ASSET_ID, fee)
}

/// Net change of `address`'s native balance, `None` on overflow.
pub(super) fn native_amount_for(
    address: &str,
    sender: &str,
    payments: &[PaymentData],
    fee: Amount,
) -> Option<Amount> {
    let mut amount = Amount::ZERO;
    if address == sender {
        amount = amount.checked_sub(fee)?;
    }
    for payment in payments.iter().filter(|p| p.asset_id == NATIVE_ASSET_ID) {
        if address == sender {
            amount = amount.checked_sub(payment.amount)?;
        }
        if address == payment.recipient {
            amount = amount.checked_add(payment.amount)?;
        }
    }
    Some(amount)
}

/// Distinct recipients in payment order.
pub(super) fn recipients(payments: &[PaymentData]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(payments.len());
    for payment in payments {
        if !out.contains(&payment.recipient) {
            out.push(payment.recipient.clone());
        }
    }
    out
}
