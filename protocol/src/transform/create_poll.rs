//! Create-poll:
//!
//! ```text
//! [header][creator key 32][owner 25][name][description]
//! [option count 4]{ [option name] [voter count 4, legacy only] }*
//! [fee][sig]
//! ```
//!
//! Transactions dated before create-poll v2 carry an always-zero voter
//! count after every option, and were signed with the REGISTER_NAME type
//! tag in place of CREATE_POLL.

use serde_json::{json, Value};

use super::serialization::{sized_length, Reader, Writer};
use super::{
    display_record, read_base_tail, signature_length, with_signature, write_header, TransformResult,
    TransformationError, BASE_LENGTH,
};
use crate::config::{
    ChainParams, ADDRESS_LENGTH, INT_LENGTH, MAX_POLL_DESCRIPTION_SIZE, MAX_POLL_NAME_SIZE,
    MAX_POLL_OPTIONS, PUBLIC_KEY_LENGTH, TYPE_LENGTH,
};
use crate::crypto::address;
use crate::data::transaction::CreatePollTransactionData;
use crate::data::{PollOptionData, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Legacy,
    Current,
}

fn layout(timestamp: i64, params: &ChainParams) -> Layout {
    if params.is_legacy_create_poll(timestamp) {
        Layout::Legacy
    } else {
        Layout::Current
    }
}

pub(super) fn decode(r: &mut Reader<'_>, params: &ChainParams) -> TransformResult<CreatePollTransactionData> {
    let timestamp = r.read_i64()?;
    let layout = layout(timestamp, params);
    let reference = r.read_signature()?;
    let creator_public_key = r.read_public_key()?;
    let owner = r.read_address()?;
    let poll_name = r.read_sized_string("poll name", MAX_POLL_NAME_SIZE)?;
    let description = r.read_sized_string("poll description", MAX_POLL_DESCRIPTION_SIZE)?;

    let count = r.read_count("poll options count", MAX_POLL_OPTIONS)?;
    if count == 0 {
        return Err(TransformationError::InvalidValue {
            field: "poll options count",
            reason: "a poll needs at least one option".to_string(),
        });
    }
    let mut poll_options = Vec::with_capacity(count);
    for _ in 0..count {
        let option_name = r.read_sized_string("poll option", MAX_POLL_NAME_SIZE)?;
        if layout == Layout::Legacy {
            let voters = r.read_i32()?;
            if voters != 0 {
                return Err(TransformationError::InvalidValue {
                    field: "poll option voter count",
                    reason: format!("expected 0, got {}", voters),
                });
            }
        }
        poll_options.push(PollOptionData::new(option_name));
    }

    let base = read_base_tail(r, timestamp, reference)?;
    Ok(CreatePollTransactionData {
        base,
        creator_public_key,
        owner,
        poll_name,
        description,
        poll_options,
    })
}

fn unsigned_length(data: &CreatePollTransactionData, layout: Layout) -> usize {
    let voter_count = match layout {
        Layout::Legacy => INT_LENGTH,
        Layout::Current => 0,
    };
    let options: usize = data
        .poll_options
        .iter()
        .map(|o| sized_length(o.option_name.len()) + voter_count)
        .sum();
    BASE_LENGTH
        + PUBLIC_KEY_LENGTH
        + ADDRESS_LENGTH
        + sized_length(data.poll_name.len())
        + sized_length(data.description.len())
        + INT_LENGTH
        + options
}

pub(super) fn encoded_length(data: &CreatePollTransactionData, params: &ChainParams) -> usize {
    unsigned_length(data, layout(data.base.timestamp, params)) + signature_length(&data.base)
}

fn encode_unsigned(data: &CreatePollTransactionData, layout: Layout) -> TransformResult<Vec<u8>> {
    let mut w = Writer::with_capacity(unsigned_length(data, layout));
    write_header(&mut w, TransactionType::CreatePoll, &data.base);
    w.write_bytes(&data.creator_public_key);
    w.write_address(&data.owner)?;
    w.write_sized_string("poll name", &data.poll_name, MAX_POLL_NAME_SIZE)?;
    w.write_sized_string("poll description", &data.description, MAX_POLL_DESCRIPTION_SIZE)?;
    w.write_count("poll options count", data.poll_options.len(), MAX_POLL_OPTIONS)?;
    for option in &data.poll_options {
        w.write_sized_string("poll option", &option.option_name, MAX_POLL_NAME_SIZE)?;
        if layout == Layout::Legacy {
            w.write_i32(0);
        }
    }
    w.write_amount(data.base.fee);
    Ok(w.into_bytes())
}

/// Legacy signing bytes: the legacy encoding under the REGISTER_NAME tag.
fn legacy_signing_bytes(data: &CreatePollTransactionData) -> TransformResult<Vec<u8>> {
    let mut bytes = encode_unsigned(data, Layout::Legacy)?;
    bytes[..TYPE_LENGTH].copy_from_slice(&TransactionType::RegisterName.value().to_be_bytes());
    Ok(bytes)
}

pub(super) fn bytes_for_signing(
    data: &CreatePollTransactionData,
    params: &ChainParams,
) -> TransformResult<Vec<u8>> {
    match layout(data.base.timestamp, params) {
        Layout::Legacy => legacy_signing_bytes(data),
        Layout::Current => encode_unsigned(data, Layout::Current),
    }
}

pub(super) fn encode(data: &CreatePollTransactionData, params: &ChainParams) -> TransformResult<Vec<u8>> {
    let unsigned = encode_unsigned(data, layout(data.base.timestamp, params))?;
    Ok(with_signature(unsigned, &data.base))
}

pub(super) fn to_display(data: &CreatePollTransactionData) -> Value {
    let options: Vec<Value> = data
        .poll_options
        .iter()
        .map(|o| json!({ "name": o.option_name }))
        .collect();
    display_record(
        TransactionType::CreatePoll,
        &data.base,
        json!({
            "creator": address::from_public_key(&data.creator_public_key),
            "creatorPublicKey": hex::encode(data.creator_public_key),
            "owner": data.owner,
            "name": data.poll_name,
            "description": data.description,
            "options": options,
        }),
    )
}
