//! Multi-payment: `[header][sender key 32][count 4][payment 45 * count][fee][sig]`.
//!
//! Before issue-asset v2 the signing bytes were only the last payment and
//! the fee, cut from the end of the unsigned encoding. Historical
//! signatures were made over exactly those 53 bytes, so the legacy form is
//! kept as is.

use serde_json::{json, Value};

use super::serialization::{Reader, Writer, PAYMENT_LENGTH};
use super::{display_record, read_base_tail, signature_length, with_signature, write_header, TransformResult, BASE_LENGTH};
use crate::config::{ChainParams, FEE_LENGTH, INT_LENGTH, MAX_PAYMENTS_COUNT, PUBLIC_KEY_LENGTH};
use crate::crypto::address;
use crate::data::transaction::MultiPaymentTransactionData;
use crate::data::TransactionType;

pub(super) fn decode(r: &mut Reader<'_>) -> TransformResult<MultiPaymentTransactionData> {
    let timestamp = r.read_i64()?;
    let reference = r.read_signature()?;
    let sender_public_key = r.read_public_key()?;
    let count = r.read_count("payments count", MAX_PAYMENTS_COUNT)?;
    let payments = (0..count)
        .map(|_| r.read_payment())
        .collect::<TransformResult<Vec<_>>>()?;
    let base = read_base_tail(r, timestamp, reference)?;
    Ok(MultiPaymentTransactionData {
        base,
        sender_public_key,
        payments,
    })
}

fn unsigned_length(data: &MultiPaymentTransactionData) -> usize {
    BASE_LENGTH + PUBLIC_KEY_LENGTH + INT_LENGTH + data.payments.len() * PAYMENT_LENGTH
}

pub(super) fn encoded_length(data: &MultiPaymentTransactionData) -> usize {
    unsigned_length(data) + signature_length(&data.base)
}

fn encode_unsigned(data: &MultiPaymentTransactionData) -> TransformResult<Vec<u8>> {
    let mut w = Writer::with_capacity(unsigned_length(data));
    write_header(&mut w, TransactionType::MultiPayment, &data.base);
    w.write_bytes(&data.sender_public_key);
    w.write_count("payments count", data.payments.len(), MAX_PAYMENTS_COUNT)?;
    for payment in &data.payments {
        w.write_payment(payment)?;
    }
    w.write_amount(data.base.fee);
    Ok(w.into_bytes())
}

/// Last payment plus fee: the tail of the unsigned encoding.
fn legacy_signing_bytes(unsigned: Vec<u8>) -> Vec<u8> {
    let keep = PAYMENT_LENGTH + FEE_LENGTH;
    let start = unsigned.len().saturating_sub(keep);
    unsigned[start..].to_vec()
}

pub(super) fn bytes_for_signing(
    data: &MultiPaymentTransactionData,
    params: &ChainParams,
) -> TransformResult<Vec<u8>> {
    let unsigned = encode_unsigned(data)?;
    if params.is_legacy_multi_payment(data.base.timestamp) {
        Ok(legacy_signing_bytes(unsigned))
    } else {
        Ok(unsigned)
    }
}

pub(super) fn encode(data: &MultiPaymentTransactionData) -> TransformResult<Vec<u8>> {
    Ok(with_signature(encode_unsigned(data)?, &data.base))
}

pub(super) fn to_display(data: &MultiPaymentTransactionData) -> Value {
    let payments: Vec<Value> = data
        .payments
        .iter()
        .map(|p| {
            json!({
                "recipient": p.recipient,
                "assetId": p.asset_id,
                "amount": p.amount.to_string(),
            })
        })
        .collect();
    display_record(
        TransactionType::MultiPayment,
        &data.base,
        json!({
            "sender": address::from_public_key(&data.sender_public_key),
            "senderPublicKey": hex::encode(data.sender_public_key),
            "payments": payments,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::data::transaction::TransactionBase;
    use crate::data::{PaymentData, Signature};

    fn multi_payment(timestamp: i64, amounts: &[i64]) -> MultiPaymentTransactionData {
        MultiPaymentTransactionData {
            base: TransactionBase::new(timestamp, Signature::from_bytes([1; 64]), Amount::from_coins(1)),
            sender_public_key: [2; 32],
            payments: amounts
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    PaymentData::new(address::from_public_key(&[(i as u8).wrapping_add(10); 32]), 0, Amount::from_coins(*a))
                })
                .collect(),
        }
    }

    #[test]
    fn legacy_signing_bytes_keep_only_last_payment_and_fee() {
        let params = ChainParams::default();
        let data = multi_payment(params.issue_asset_v2_timestamp - 1, &[5, 6, 7]);
        let unsigned = encode_unsigned(&data).unwrap();
        let signing = bytes_for_signing(&data, &params).unwrap();

        assert_eq!(signing.len(), PAYMENT_LENGTH + FEE_LENGTH);
        assert_eq!(&signing[..], &unsigned[unsigned.len() - 53..]);

        // Earlier payments do not influence the legacy signing bytes.
        let mut other = data.clone();
        other.payments[0].amount = Amount::from_coins(500);
        assert_eq!(bytes_for_signing(&other, &params).unwrap(), signing);
    }

    #[test]
    fn current_signing_bytes_cover_everything() {
        let params = ChainParams::default();
        let data = multi_payment(params.issue_asset_v2_timestamp, &[5, 6, 7]);
        assert_eq!(bytes_for_signing(&data, &params).unwrap(), encode_unsigned(&data).unwrap());
    }

    #[test]
    fn too_many_payments_cannot_be_encoded() {
        let amounts = vec![1; MAX_PAYMENTS_COUNT + 1];
        let data = multi_payment(0, &amounts);
        assert!(encode(&data).is_err());
    }
}
