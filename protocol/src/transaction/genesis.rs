//! Genesis: the initial native allocation to one address.

use super::validation::ValidationResult;
use super::TransactionError;
use crate::account::Account;
use crate::amount::Amount;
use crate::config::NATIVE_ASSET_ID;
use crate::crypto::address;
use crate::data::transaction::GenesisTransactionData;
use crate::data::Signature;
use crate::repository::Repository;

pub(super) fn is_valid(data: &GenesisTransactionData) -> ValidationResult {
    if data.amount.is_negative() {
        return ValidationResult::NegativeAmount;
    }
    if !address::is_valid(&data.recipient) {
        return ValidationResult::InvalidAddress;
    }
    ValidationResult::Ok
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut GenesisTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let recipient = Account::new(data.recipient.as_str());
    recipient.set_confirmed_balance(repository, NATIVE_ASSET_ID, data.amount)?;
    recipient.set_last_reference(repository, Some(signature))?;
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut GenesisTransactionData,
    repository: &mut R,
) -> Result<(), TransactionError> {
    let recipient = Account::new(data.recipient.as_str());
    recipient.set_confirmed_balance(repository, NATIVE_ASSET_ID, Amount::ZERO)?;
    recipient.set_last_reference(repository, None)?;
    Ok(())
}

pub(super) fn amount_for(data: &GenesisTransactionData, address: &str) -> Option<Amount> {
    if address == data.recipient {
        Some(data.amount)
    } else {
        Some(Amount::ZERO)
    }
}
