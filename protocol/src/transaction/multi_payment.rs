//! Multi-payment: up to [`MAX_PAYMENTS_COUNT`] legs in one transaction.

use super::payments;
use super::validation::{ensure, ValidationResult};
use super::{can_afford, reference_matches, TransactionError};
use crate::account::PublicKeyAccount;
use crate::amount::Amount;
use crate::config::{ChainParams, MAX_PAYMENTS_COUNT};
use crate::data::transaction::MultiPaymentTransactionData;
use crate::data::Signature;
use crate::repository::{DataResult, Repository};

pub(super) fn is_valid<R: Repository + ?Sized>(
    data: &MultiPaymentTransactionData,
    repository: &R,
    params: &ChainParams,
) -> DataResult<ValidationResult> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    ensure!(
        reference_matches(repository, &sender, &data.base.reference)?,
        ValidationResult::InvalidReference
    );
    ensure!(
        params.is_assets_released(data.base.timestamp),
        ValidationResult::NotYetReleased
    );
    ensure!(
        (1..=MAX_PAYMENTS_COUNT).contains(&data.payments.len()),
        ValidationResult::InvalidPaymentsCount
    );
    if params.is_powfix_released(data.base.timestamp) {
        ensure!(
            can_afford(repository, &sender, data.base.fee)?,
            ValidationResult::NoBalance
        );
    }
    payments::is_valid(repository, &sender, &data.payments, data.base.fee)
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut MultiPaymentTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::process(repository, &sender, &data.payments, data.base.fee, signature)?;
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut MultiPaymentTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::orphan(
        repository,
        &sender,
        &data.payments,
        data.base.fee,
        signature,
        data.base.reference,
    )?;
    Ok(())
}

pub(super) fn amount_for(data: &MultiPaymentTransactionData, address: &str) -> Option<Amount> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::native_amount_for(address, sender.address(), &data.payments, data.base.fee)
}
