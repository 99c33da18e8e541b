//! Payment: `[header][sender key 32][recipient 25][amount 8][fee][sig]`.

use serde_json::{json, Value};

use super::serialization::{Reader, Writer};
use super::{display_record, read_base_tail, signature_length, with_signature, write_header, TransformResult, BASE_LENGTH};
use crate::config::{ADDRESS_LENGTH, AMOUNT_LENGTH, PUBLIC_KEY_LENGTH};
use crate::crypto::address;
use crate::data::transaction::PaymentTransactionData;
use crate::data::TransactionType;

const PAYLOAD_LENGTH: usize = PUBLIC_KEY_LENGTH + ADDRESS_LENGTH + AMOUNT_LENGTH;

pub(super) fn decode(r: &mut Reader<'_>) -> TransformResult<PaymentTransactionData> {
    let timestamp = r.read_i64()?;
    let reference = r.read_signature()?;
    let sender_public_key = r.read_public_key()?;
    let recipient = r.read_address()?;
    let amount = r.read_amount()?;
    let base = read_base_tail(r, timestamp, reference)?;
    Ok(PaymentTransactionData {
        base,
        sender_public_key,
        recipient,
        amount,
    })
}

pub(super) fn encoded_length(data: &PaymentTransactionData) -> usize {
    BASE_LENGTH + PAYLOAD_LENGTH + signature_length(&data.base)
}

pub(super) fn bytes_for_signing(data: &PaymentTransactionData) -> TransformResult<Vec<u8>> {
    let mut w = Writer::with_capacity(BASE_LENGTH + PAYLOAD_LENGTH);
    write_header(&mut w, TransactionType::Payment, &data.base);
    w.write_bytes(&data.sender_public_key);
    w.write_address(&data.recipient)?;
    w.write_amount(data.amount);
    w.write_amount(data.base.fee);
    Ok(w.into_bytes())
}

pub(super) fn encode(data: &PaymentTransactionData) -> TransformResult<Vec<u8>> {
    Ok(with_signature(bytes_for_signing(data)?, &data.base))
}

pub(super) fn to_display(data: &PaymentTransactionData) -> Value {
    display_record(
        TransactionType::Payment,
        &data.base,
        json!({
            "sender": address::from_public_key(&data.sender_public_key),
            "senderPublicKey": hex::encode(data.sender_public_key),
            "recipient": data.recipient,
            "amount": data.amount.to_string(),
        }),
    )
}
