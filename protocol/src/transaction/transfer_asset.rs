//! Transfer-asset: a single payment leg in any asset.

use super::payments;
use super::validation::{ensure, ValidationResult};
use super::{reference_matches, TransactionError};
use crate::account::PublicKeyAccount;
use crate::amount::Amount;
use crate::config::ChainParams;
use crate::data::transaction::TransferAssetTransactionData;
use crate::data::Signature;
use crate::repository::{DataResult, Repository};

pub(super) fn is_valid<R: Repository + ?Sized>(
    data: &TransferAssetTransactionData,
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
    payments::is_valid(repository, &sender, &[data.payment()], data.base.fee)
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut TransferAssetTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::process(repository, &sender, &[data.payment()], data.base.fee, signature)?;
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut TransferAssetTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::orphan(
        repository,
        &sender,
        &[data.payment()],
        data.base.fee,
        signature,
        data.base.reference,
    )?;
    Ok(())
}

pub(super) fn amount_for(data: &TransferAssetTransactionData, address: &str) -> Option<Amount> {
    let sender = PublicKeyAccount::new(data.sender_public_key);
    payments::native_amount_for(address, sender.address(), &[data.payment()], data.base.fee)
}
