//! Vote-on-poll: cast or change a vote. The previous vote is recorded in
//! the transaction so orphaning can put it back.

use super::validation::{ensure, ValidationResult};
use super::{can_afford, length_within, reference_matches, TransactionError};
use crate::account::PublicKeyAccount;
use crate::config::{ChainParams, MAX_POLL_NAME_SIZE, NATIVE_ASSET_ID};
use crate::data::transaction::VoteOnPollTransactionData;
use crate::data::{Signature, VoteOnPollData};
use crate::repository::{DataResult, Repository};

pub(super) fn is_valid<R: Repository + ?Sized>(
    data: &VoteOnPollTransactionData,
    repository: &R,
    params: &ChainParams,
) -> DataResult<ValidationResult> {
    let voter = PublicKeyAccount::new(data.voter_public_key);
    ensure!(
        reference_matches(repository, &voter, &data.base.reference)?,
        ValidationResult::InvalidReference
    );
    ensure!(
        params.is_voting_released(data.base.timestamp),
        ValidationResult::NotYetReleased
    );
    ensure!(
        length_within(&data.poll_name, MAX_POLL_NAME_SIZE),
        ValidationResult::InvalidNameLength
    );
    ensure!(
        data.poll_name == data.poll_name.to_lowercase(),
        ValidationResult::NameNotLowerCase
    );

    let poll = match repository.fetch_poll(&data.poll_name)? {
        Some(poll) => poll,
        None => return Ok(ValidationResult::PollDoesNotExist),
    };
    let in_range = usize::try_from(data.option_index)
        .map(|i| i < poll.poll_options.len())
        .unwrap_or(false);
    ensure!(in_range, ValidationResult::PollOptionDoesNotExist);

    if let Some(vote) = repository.fetch_vote(&data.poll_name, &data.voter_public_key)? {
        ensure!(
            vote.option_index != data.option_index,
            ValidationResult::AlreadyVotedForThatOption
        );
    }

    ensure!(data.base.fee.is_positive(), ValidationResult::NegativeFee);
    ensure!(
        can_afford(repository, &voter, data.base.fee)?,
        ValidationResult::NoBalance
    );
    Ok(ValidationResult::Ok)
}

pub(super) fn process<R: Repository + ?Sized>(
    data: &mut VoteOnPollTransactionData,
    repository: &mut R,
    signature: Signature,
) -> Result<(), TransactionError> {
    let voter = PublicKeyAccount::new(data.voter_public_key);
    data.previous_option_index = repository
        .fetch_vote(&data.poll_name, &data.voter_public_key)?
        .map(|v| v.option_index);

    repository.save_vote(&VoteOnPollData {
        poll_name: data.poll_name.clone(),
        voter_public_key: data.voter_public_key,
        option_index: data.option_index,
    })?;
    voter.adjust_balance(repository, NATIVE_ASSET_ID, -data.base.fee)?;
    voter.set_last_reference(repository, Some(signature))?;
    Ok(())
}

pub(super) fn orphan<R: Repository + ?Sized>(
    data: &mut VoteOnPollTransactionData,
    repository: &mut R,
) -> Result<(), TransactionError> {
    let voter = PublicKeyAccount::new(data.voter_public_key);
    match data.previous_option_index.take() {
        Some(option_index) => repository.save_vote(&VoteOnPollData {
            poll_name: data.poll_name.clone(),
            voter_public_key: data.voter_public_key,
            option_index,
        })?,
        None => repository.delete_vote(&data.poll_name, &data.voter_public_key)?,
    }
    voter.adjust_balance(repository, NATIVE_ASSET_ID, data.base.fee)?;
    voter.set_last_reference(repository, Some(data.base.reference))?;
    Ok(())
}
