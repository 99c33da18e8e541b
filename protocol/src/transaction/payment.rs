//! Payment: native-asset transfer through the shared payment routine.

use super::payments;
use super::validation::{ensure, ValidationResult};
use super::{reference_matches, TransactionError};
use crate::account::PublicKeyAccount;
use crate::amount::Amount;
use crate::config::NATIVE_ASSET_ID;
use crate::data::transaction::PaymentTransactionData;
use crate::data::{PaymentData, Signature};
use crate::repository::{DataResult, Repository};

fn legs(data: &PaymentTransactionData) -> [PaymentData; 1] {
    [PaymentData::new(data.recipient.clone(), NATIVE_ASSET_ID, data.amount)]
}

pub(super) fn is_valid<R: Repository + ?Sized>(
    data: &PaymentTransactionData,
    repository: &R,
) -> DataResult<ValidationResult> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    ensure!(
        reference_matches(repository, &sender, &data.base.reference)?,
        ValidationResult::InvalidReference
    );
    payments::is_valid(repository, &sender, &legs(data), data.base.fee)
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut PaymentTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::process(repository, &sender, &legs(data), data.base.fee, signature)?;
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut PaymentTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::orphan(
        repository,
        &sender,
        &legs(data),
        data.base.fee,
        signature,
        data.base.reference,
    )?;
    Ok(())
}

pub(super) fn amount_for(data: &PaymentTransactionData, address: &str) -> Option<Amount> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::native_amount_for(address, sender.address(), &legs(data), data.base.fee)
}
