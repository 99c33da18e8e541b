//! Create-poll: publish a named poll with its options.

use std::collections::HashSet;

use super::validation::{ensure, ValidationResult};
use super::{can_afford, length_within, reference_matches, TransactionError};
use crate::account::PublicKeyAccount;
use crate::config::{
    ChainParams, MAX_POLL_DESCRIPTION_SIZE, MAX_POLL_NAME_SIZE, MAX_POLL_OPTIONS, NATIVE_ASSET_ID,
};
use crate::crypto::address;
use crate::data::transaction::CreatePollTransactionData;
use crate::data::{PollData, Signature};
use crate::repository::{DataResult, Repository};

pub(super) fn is_valid<R: Repository + ?Sized>(
    data: &CreatePollTransactionData,
    repository: &R,
    params: &ChainParams,
) -> DataResult<ValidationResult> {
    let creator = PublicKeyAccount::new(data.creator_public_key);
    ensure!(
        reference_matches(repository, &creator, &data.base.reference)?,
        ValidationResult::InvalidReference
    );
    ensure!(
        params.is_voting_released(data.base.timestamp),
        ValidationResult::NotYetReleased
    );
    ensure!(address::is_valid(&data.owner), ValidationResult::InvalidAddress);
    ensure!(
        length_within(&data.poll_name, MAX_POLL_NAME_SIZE),
        ValidationResult::InvalidNameLength
    );
    ensure!(
        length_within(&data.description, MAX_POLL_DESCRIPTION_SIZE),
        ValidationResult::InvalidDescriptionLength
    );
    ensure!(
        data.poll_name == data.poll_name.to_lowercase(),
        ValidationResult::NameNotLowerCase
    );
    ensure!(
        !repository.poll_exists(&data.poll_name)?,
        ValidationResult::PollAlreadyExists
    );
    ensure!(
        (1..=MAX_POLL_OPTIONS).contains(&data.poll_options.len()),
        ValidationResult::InvalidOptionsCount
    );

    let mut seen = HashSet::with_capacity(data.poll_options.len());
    for option in &data.poll_options {
        ensure!(
            length_within(&option.option_name, MAX_POLL_NAME_SIZE),
            ValidationResult::InvalidOptionLength
        );
        ensure!(
            seen.insert(option.option_name.as_str()),
            ValidationResult::DuplicateOption
        );
    }

    ensure!(data.base.fee.is_positive(), ValidationResult::NegativeFee);
    ensure!(
        can_afford(repository, &creator, data.base.fee)?,
        ValidationResult::NoBalance
    );
    Ok(ValidationResult::Ok)
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut CreatePollTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let creator = PublicKeyAccount::new(data.creator_public_key);
    repository.save_poll(&PollData {
        creator_public_key: data.creator_public_key,
        owner: data.owner.clone(),
        poll_name: data.poll_name.clone(),
        description: data.description.clone(),
        poll_options: data.poll_options.clone(),
        published: data.base.timestamp,
    })?;
    creator.adjust_balance(repository, NATIVE_ASSET_ID, -data.base.fee)?;
    creator.set_last_reference(repository, Some(signature))?;
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut CreatePollTransactionData,
    repository: &mut R,
) -> Result<(), TransactionError> {
    let creator = PublicKeyAccount::new(data.creator_public_key);
    repository.delete_poll(&data.poll_name)?;
    creator.adjust_balance(repository, NATIVE_ASSET_ID, data.base.fee)?;
    creator.set_last_reference(repository, Some(data.base.reference))?;
    Ok(())
}
