//! AT settlement:
//!
//! ```text
//! [header][AT address 25][recipient 25][payment flag 1]
//! [asset id 8][amount 8]   -- only when the flag is set
//! [message][fee][sig]
//! ```
//!
//! The message is bounded by the frame only; its consensus limit is a
//! validation rule.

use serde_json::{json, Value};

use super::serialization::{sized_length, Reader, Writer};
use super::{display_record, read_base_tail, signature_length, with_signature, write_header, TransformResult, BASE_LENGTH};
use crate::config::{ADDRESS_LENGTH, AMOUNT_LENGTH, BOOLEAN_LENGTH, LONG_LENGTH};
use crate::data::transaction::{AtPayment, AtTransactionData};
use crate::data::TransactionType;

pub(super) fn decode(r: &mut Reader<'_>) -> TransformResult<AtTransactionData> {
    let timestamp = r.read_i64()?;
    let reference = r.read_signature()?;
    let at_address = r.read_address()?;
    let recipient = r.read_address()?;
    let payment = if r.read_bool("AT payment flag")? {
        let asset_id = r.read_u64()?;
        let amount = r.read_amount()?;
        Some(AtPayment { asset_id, amount })
    } else {
        None
    };
    let frame_left = r.remaining();
    let message = r.read_sized_bytes("AT message", frame_left)?;
    let base = read_base_tail(r, timestamp, reference)?;
    Ok(AtTransactionData {
        base,
        at_address,
        recipient,
        payment,
        message,
    })
}

fn unsigned_length(data: &AtTransactionData) -> usize {
    let payment = if data.payment.is_some() {
        LONG_LENGTH + AMOUNT_LENGTH
    } else {
        0
    };
    BASE_LENGTH + 2 * ADDRESS_LENGTH + BOOLEAN_LENGTH + payment + sized_length(data.message.len())
}

pub(super) fn encoded_length(data: &AtTransactionData) -> usize {
    unsigned_length(data) + signature_length(&data.base)
}

pub(super) fn bytes_for_signing(data: &AtTransactionData) -> TransformResult<Vec<u8>> {
    let mut w = Writer::with_capacity(unsigned_length(data));
    write_header(&mut w, TransactionType::At, &data.base);
    w.write_address(&data.at_address)?;
    w.write_address(&data.recipient)?;
    w.write_bool(data.payment.is_some());
    if let Some(payment) = &data.payment {
        w.write_u64(payment.asset_id);
        w.write_amount(payment.amount);
    }
    w.write_sized_bytes("AT message", &data.message, i32::MAX as usize)?;
    w.write_amount(data.base.fee);
    Ok(w.into_bytes())
}

pub(super) fn encode(data: &AtTransactionData) -> TransformResult<Vec<u8>> {
    Ok(with_signature(bytes_for_signing(data)?, &data.base))
}

pub(super) fn to_display(data: &AtTransactionData) -> Value {
    display_record(
        TransactionType::At,
        &data.base,
        json!({
            "atAddress": data.at_address,
            "recipient": data.recipient,
            "assetId": data.payment.map(|p| p.asset_id),
            "amount": data.payment.map(|p| p.amount.to_string()),
            "message": hex::encode(&data.message),
        }),
    )
}
