//! Vote-on-poll: `[header][voter key 32][poll name][option index 4][fee][sig]`.

use serde_json::{json, Value};

use super::serialization::{sized_length, Reader, Writer};
use super::{display_record, read_base_tail, signature_length, with_signature, write_header, TransformResult, BASE_LENGTH};
use crate::config::{INT_LENGTH, MAX_POLL_NAME_SIZE, PUBLIC_KEY_LENGTH};
use crate::crypto::address;
use crate::data::transaction::VoteOnPollTransactionData;
use crate::data::TransactionType;

pub(super) fn decode(r: &mut Reader<'_>) -> TransformResult<VoteOnPollTransactionData> {
    let timestamp = r.read_i64()?;
    let reference = r.read_signature()?;
    let voter_public_key = r.read_public_key()?;
    let poll_name = r.read_sized_string("poll name", MAX_POLL_NAME_SIZE)?;
    let option_index = r.read_i32()?;
    let base = read_base_tail(r, timestamp, reference)?;
    Ok(VoteOnPollTransactionData {
        base,
        voter_public_key,
        poll_name,
        option_index,
        previous_option_index: None,
    })
}

fn unsigned_length(data: &VoteOnPollTransactionData) -> usize {
    BASE_LENGTH + PUBLIC_KEY_LENGTH + sized_length(data.poll_name.len()) + INT_LENGTH
}

pub(super) fn encoded_length(data: &VoteOnPollTransactionData) -> usize {
    unsigned_length(data) + signature_length(&data.base)
}

pub(super) fn bytes_for_signing(data: &VoteOnPollTransactionData) -> TransformResult<Vec<u8>> {
    let mut w = Writer::with_capacity(unsigned_length(data));
    write_header(&mut w, TransactionType::VoteOnPoll, &data.base);
    w.write_bytes(&data.voter_public_key);
    w.write_sized_string("poll name", &data.poll_name, MAX_POLL_NAME_SIZE)?;
    w.write_i32(data.option_index);
    w.write_amount(data.base.fee);
    Ok(w.into_bytes())
}

pub(super) fn encode(data: &VoteOnPollTransactionData) -> TransformResult<Vec<u8>> {
    Ok(with_signature(bytes_for_signing(data)?, &data.base))
}

pub(super) fn to_display(data: &VoteOnPollTransactionData) -> Value {
    display_record(
        TransactionType::VoteOnPoll,
        &data.base,
        json!({
            "voter": address::from_public_key(&data.voter_public_key),
            "voterPublicKey": hex::encode(data.voter_public_key),
            "poll": data.poll_name,
            "option": data.option_index,
        }),
    )
}
