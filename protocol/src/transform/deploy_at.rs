//! Deploy-AT:
//!
//! ```text
//! [header][creator key 32][name][description][AT type][tags]
//! [creation bytes][amount 8][fee][sig]
//! ```

use serde_json::{json, Value};

use super::serialization::{sized_length, Reader, Writer};
use super::{display_record, read_base_tail, signature_length, with_signature, write_header, TransformResult, BASE_LENGTH};
use crate::config::{
    AMOUNT_LENGTH, MAX_AT_CREATION_BYTES_SIZE, MAX_AT_DESCRIPTION_SIZE, MAX_AT_NAME_SIZE,
    MAX_AT_TAGS_SIZE, MAX_AT_TYPE_SIZE, PUBLIC_KEY_LENGTH,
};
use crate::crypto::address;
use crate::data::transaction::DeployAtTransactionData;
use crate::data::TransactionType;

pub(super) fn decode(r: &mut Reader<'_>) -> TransformResult<DeployAtTransactionData> {
    let timestamp = r.read_i64()?;
    let reference = r.read_signature()?;
    let creator_public_key = r.read_public_key()?;
    let name = r.read_sized_string("AT name", MAX_AT_NAME_SIZE)?;
    let description = r.read_sized_string("AT description", MAX_AT_DESCRIPTION_SIZE)?;
    let at_type = r.read_sized_string("AT type", MAX_AT_TYPE_SIZE)?;
    let tags = r.read_sized_string("AT tags", MAX_AT_TAGS_SIZE)?;
    let creation_bytes = r.read_sized_bytes("AT creation bytes", MAX_AT_CREATION_BYTES_SIZE)?;
    let amount = r.read_amount()?;
    let base = read_base_tail(r, timestamp, reference)?;
    Ok(DeployAtTransactionData {
        base,
        creator_public_key,
        name,
        description,
        at_type,
        tags,
        creation_bytes,
        amount,
        at_address: None,
    })
}

fn unsigned_length(data: &DeployAtTransactionData) -> usize {
    BASE_LENGTH
        + PUBLIC_KEY_LENGTH
        + sized_length(data.name.len())
        + sized_length(data.description.len())
        + sized_length(data.at_type.len())
        + sized_length(data.tags.len())
        + sized_length(data.creation_bytes.len())
        + AMOUNT_LENGTH
}

pub(super) fn encoded_length(data: &DeployAtTransactionData) -> usize {
    unsigned_length(data) + signature_length(&data.base)
}

pub(super) fn bytes_for_signing(data: &DeployAtTransactionData) -> TransformResult<Vec<u8>> {
    let mut w = Writer::with_capacity(unsigned_length(data));
    write_header(&mut w, TransactionType::DeployAt, &data.base);
    w.write_bytes(&data.creator_public_key);
    w.write_sized_string("AT name", &data.name, MAX_AT_NAME_SIZE)?;
    w.write_sized_string("AT description", &data.description, MAX_AT_DESCRIPTION_SIZE)?;
    w.write_sized_string("AT type", &data.at_type, MAX_AT_TYPE_SIZE)?;
    w.write_sized_string("AT tags", &data.tags, MAX_AT_TAGS_SIZE)?;
    w.write_sized_bytes("AT creation bytes", &data.creation_bytes, MAX_AT_CREATION_BYTES_SIZE)?;
    w.write_amount(data.amount);
    w.write_amount(data.base.fee);
    Ok(w.into_bytes())
}

pub(super) fn encode(data: &DeployAtTransactionData) -> TransformResult<Vec<u8>> {
    Ok(with_signature(bytes_for_signing(data)?, &data.base))
}

pub(super) fn to_display(data: &DeployAtTransactionData) -> Value {
    display_record(
        TransactionType::DeployAt,
        &data.base,
        json!({
            "creator": address::from_public_key(&data.creator_public_key),
            "creatorPublicKey": hex::encode(data.creator_public_key),
            "name": data.name,
            "description": data.description,
            "atType": data.at_type,
            "tags": data.tags,
            "creationBytes": bs58::encode(&data.creation_bytes).into_string(),
            "amount": data.amount.to_string(),
            "atAddress": data.at_address,
        }),
    )
}
