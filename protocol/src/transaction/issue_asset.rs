//! Issue-asset: create a new asset and credit its owner with the whole
//! quantity.

use super::validation::{ensure, ValidationResult};
use super::{can_afford, length_within, reference_matches, TransactionError};
use crate::account::{Account, PublicKeyAccount};
use crate::amount::Amount;
use crate::config::{
    ChainParams, MAX_ASSET_DESCRIPTION_SIZE, MAX_ASSET_NAME_SIZE, MAX_ASSET_QUANTITY, NATIVE_ASSET_ID,
};
use crate::crypto::address;
use crate::data::transaction::IssueAssetTransactionData;
use crate::data::{AssetData, Signature, TransactionType};
use crate::repository::{DataResult, Repository};

pub(super) fn is_valid<R: Repository + ?Sized>(
    data: &IssueAssetTransactionData,
    repository: &R,
    params: &ChainParams,
) -> DataResult<ValidationResult> {
    let issuer = PublicKeyAccount::new(data.issuer_public_key);
    ensure!(
        reference_matches(repository, &issuer, &data.base.reference)?,
        ValidationResult::InvalidReference
    );
    ensure!(
        params.is_assets_released(data.base.timestamp),
        ValidationResult::NotYetReleased
    );
    ensure!(address::is_valid(&data.owner), ValidationResult::InvalidAddress);
    ensure!(
        length_within(&data.asset_name, MAX_ASSET_NAME_SIZE),
        ValidationResult::InvalidNameLength
    );
    ensure!(
        length_within(&data.description, MAX_ASSET_DESCRIPTION_SIZE),
        ValidationResult::InvalidDescriptionLength
    );
    ensure!(
        (1..=MAX_ASSET_QUANTITY).contains(&data.quantity),
        ValidationResult::InvalidQuantity
    );
    ensure!(data.base.fee.is_positive(), ValidationResult::NegativeFee);
    ensure!(
        can_afford(repository, &issuer, data.base.fee)?,
        ValidationResult::NoBalance
    );
    ensure!(
        !repository.asset_name_exists(&data.asset_name)?,
        ValidationResult::AssetAlreadyExists
    );
    Ok(ValidationResult::Ok)
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut IssueAssetTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let issuer = PublicKeyAccount::new(data.issuer_public_key);
    let asset_id = repository.next_asset_id()?;
    repository.save_asset(&AssetData {
        asset_id,
        owner: data.owner.clone(),
        name: data.asset_name.clone(),
        description: data.description.clone(),
        quantity: data.quantity,
        is_divisible: data.is_divisible,
        reference: signature,
    })?;
    data.asset_id = Some(asset_id);

    Account::new(data.owner.as_str()).set_confirmed_balance(
        repository,
        asset_id,
        Amount::from_coins(data.quantity),
    )?;
    issuer.adjust_balance(repository, NATIVE_ASSET_ID, -data.base.fee)?;
    issuer.set_last_reference(repository, Some(signature))?;
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut IssueAssetTransactionData,
    repository: &mut R,
) -> Result<(), TransactionError> {
    let asset_id = data
        .asset_id
        .take()
        .ok_or(TransactionError::MissingProcessingState {
            transaction_type: TransactionType::IssueAsset,
            field: "asset id",
        })?;
    let issuer = PublicKeyAccount::new(data.issuer_public_key);

    repository.delete_asset(asset_id)?;
    repository.delete_balance(&data.owner, asset_id)?;
    issuer.adjust_balance(repository, NATIVE_ASSET_ID, data.base.fee)?;
    issuer.set_last_reference(repository, Some(data.base.reference))?;
    Ok(())
}
