//! Deploy-AT: register an automated-transaction program and fund its
//! account.
//!
//! The AT address is derived from the deploy transaction's signing bytes,
//! so it is known only once the transaction is processed. It is stored in
//! the record so orphaning can find the AT again.

use super::validation::{ensure, ValidationResult};
use super::{length_within, reference_matches, TransactionError};
use crate::account::{Account, PublicKeyAccount};
use crate::amount::Amount;
use crate::config::{
    ChainParams, MAX_AT_CREATION_BYTES_SIZE, MAX_AT_DESCRIPTION_SIZE, MAX_AT_NAME_SIZE,
    MAX_AT_TAGS_SIZE, MAX_AT_TYPE_SIZE, NATIVE_ASSET_ID,
};
use crate::crypto::address;
use crate::data::transaction::DeployAtTransactionData;
use crate::data::{AtData, Signature, TransactionData, TransactionType};
use crate::repository::{DataResult, Repository};
use crate::transform;

/// Code version carried in the first two bytes of the creation bytes.
/// Zero and headers shorter than two bytes are rejected.
fn code_version(creation_bytes: &[u8]) -> Option<i16> {
    match creation_bytes {
        [hi, lo, ..] => Some(i16::from_be_bytes([*hi, *lo])).filter(|v| *v != 0),
        _ => None,
    }
}

pub(super) fn is_valid<R: Repository + ?Sized>(
    data: &DeployAtTransactionData,
    repository: &R,
    params: &ChainParams,
) -> DataResult<ValidationResult> {
    let creator = PublicKeyAccount::new(data.creator_public_key);
    ensure!(
        reference_matches(repository, &creator, &data.base.reference)?,
        ValidationResult::InvalidReference
    );
    ensure!(
        params.is_at_released(data.base.timestamp),
        ValidationResult::NotYetReleased
    );
    ensure!(
        length_within(&data.name, MAX_AT_NAME_SIZE),
        ValidationResult::InvalidNameLength
    );
    ensure!(
        length_within(&data.description, MAX_AT_DESCRIPTION_SIZE),
        ValidationResult::InvalidDescriptionLength
    );
    ensure!(
        length_within(&data.at_type, MAX_AT_TYPE_SIZE),
        ValidationResult::InvalidAtTypeLength
    );
    ensure!(
        length_within(&data.tags, MAX_AT_TAGS_SIZE),
        ValidationResult::InvalidTagsLength
    );
    ensure!(
        data.creation_bytes.len() <= MAX_AT_CREATION_BYTES_SIZE
            && code_version(&data.creation_bytes).is_some(),
        ValidationResult::InvalidCreationBytes
    );
    ensure!(data.amount.is_positive(), ValidationResult::NegativeAmount);
    ensure!(data.base.fee.is_positive(), ValidationResult::NegativeFee);

    let cost = match data.base.fee.checked_add(data.amount) {
        Some(cost) => cost,
        None => return Ok(ValidationResult::InvalidAmount),
    };
    ensure!(
        creator.confirmed_balance(repository, NATIVE_ASSET_ID)? >= cost,
        ValidationResult::NoBalance
    );
    Ok(ValidationResult::Ok)
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut DeployAtTransactionData,
    repository: &mut R,
    params: &ChainParams,
    signature: Signature,
) -> Result<(), TransactionError> {
    let version = code_version(&data.creation_bytes).ok_or(TransactionError::MissingProcessingState {
        transaction_type: TransactionType::DeployAt,
        field: "code version",
    })?;
    let seed = transform::bytes_for_signing(&TransactionData::DeployAt(data.clone()), params)?;
    let at_address = address::at_address_from_seed(&seed);
    let creator = PublicKeyAccount::new(data.creator_public_key);
    let at_account = Account::new(at_address.as_str());

    repository.save_at(&AtData::deployed(
        at_address.clone(),
        creator.address().to_string(),
        data.base.timestamp,
        version,
        data.creation_bytes.clone(),
    ))?;

    creator.adjust_balance(repository, NATIVE_ASSET_ID, -(data.base.fee + data.amount))?;
    at_account.adjust_balance(repository, NATIVE_ASSET_ID, data.amount)?;
    creator.set_last_reference(repository, Some(signature))?;
    at_account.set_last_reference(repository, Some(signature))?;

    data.at_address = Some(at_address);
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut DeployAtTransactionData,
    repository: &mut R,
    _params: &ChainParams,
) -> Result<(), TransactionError> {
    let at_address = data
        .at_address
        .take()
        .ok_or(TransactionError::MissingProcessingState {
            transaction_type: TransactionType::DeployAt,
            field: "AT address",
        })?;
    let creator = PublicKeyAccount::new(data.creator_public_key);
    let at_account = Account::new(at_address.as_str());

    repository.delete_at(&at_address)?;
    at_account.adjust_balance(repository, NATIVE_ASSET_ID, -data.amount)?;
    at_account.set_last_reference(repository, None)?;
    creator.adjust_balance(repository, NATIVE_ASSET_ID, data.base.fee + data.amount)?;
    creator.set_last_reference(repository, Some(data.base.reference))?;
    Ok(())
}

pub(super) fn amount_for(data: &DeployAtTransactionData, address: &str) -> Option<Amount> {
    let mut amount = Amount::ZERO;
    if address::from_public_key(&data.creator_public_key) == address {
        amount = amount.checked_sub(data.base.fee.checked_add(data.amount)?)?;
    }
    if data.at_address.as_deref() == Some(address) {
        amount = amount.checked_add(data.amount)?;
    }
    Some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_version_needs_two_non_zero_bytes() {
        assert_eq!(code_version(&[]), None);
        assert_eq!(code_version(&[1]), None);
        assert_eq!(code_version(&[0, 0, 9]), None);
        assert_eq!(code_version(&[0, 2, 0xff]), Some(2));
        assert_eq!(code_version(&[0xff, 0xfe]), Some(-2));
    }
}
