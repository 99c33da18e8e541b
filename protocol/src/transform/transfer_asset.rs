//! Transfer-asset: `[header][sender key 32][recipient 25][asset id 8][amount 12][fee][sig]`.

use serde_json::{json, Value};

use super::serialization::{Reader, Writer, PAYMENT_LENGTH};
use super::{display_record, read_base_tail, signature_length, with_signature, write_header, TransformResult, BASE_LENGTH};
use crate::config::PUBLIC_KEY_LENGTH;
use crate::crypto::address;
use crate::data::transaction::TransferAssetTransactionData;
use crate::data::TransactionType;

const PAYLOAD_LENGTH: usize = PUBLIC_KEY_LENGTH + PAYMENT_LENGTH;

pub(super) fn decode(r: &mut Reader<'_>) -> TransformResult<TransferAssetTransactionData> {
    let timestamp = r.read_i64()?;
    let reference = r.read_signature()?;
    let sender_public_key = r.read_public_key()?;
    let payment = r.read_payment()?;
    let base = read_base_tail(r, timestamp, reference)?;
    Ok(TransferAssetTransactionData {
        base,
        sender_public_key,
        recipient: payment.recipient,
        asset_id: payment.asset_id,
        amount: payment.amount,
    })
}

pub(super) fn encoded_length(data: &TransferAssetTransactionData) -> usize {
    BASE_LENGTH + PAYLOAD_LENGTH + signature_length(&data.base)
}

pub(super) fn bytes_for_signing(data: &TransferAssetTransactionData) -> TransformResult<Vec<u8>> {
    let mut w = Writer::with_capacity(BASE_LENGTH + PAYLOAD_LENGTH);
    write_header(&mut w, TransactionType::TransferAsset, &data.base);
    w.write_bytes(&data.sender_public_key);
    w.write_payment(&data.payment())?;
    w.write_amount(data.base.fee);
    Ok(w.into_bytes())
}

pub(super) fn encode(data: &TransferAssetTransactionData) -> TransformResult<Vec<u8>> {
    Ok(with_signature(bytes_for_signing(data)?, &data.base))
}

pub(super) fn to_display(data: &TransferAssetTransactionData) -> Value {
    display_record(
        TransactionType::TransferAsset,
        &data.base,
        json!({
            "sender": address::from_public_key(&data.sender_public_key),
            "senderPublicKey": hex::encode(data.sender_public_key),
            "recipient": data.recipient,
            "assetId": data.asset_id,
            "amount": data.amount.to_string(),
        }),
    )
}
