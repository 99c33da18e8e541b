//! Genesis: `[type][timestamp][recipient 25][amount 8]`.
//!
//! Genesis records carry no reference, fee or signature. Their signature
//! is derived from their own bytes.

use serde_json::{json, Value};

use super::serialization::{Reader, Writer};
use super::TransformResult;
use crate::config::{ADDRESS_LENGTH, AMOUNT_LENGTH, TIMESTAMP_LENGTH, TYPE_LENGTH};
use crate::crypto::derived_signature;
use crate::data::transaction::GenesisTransactionData;
use crate::data::{Signature, TransactionType};

const LENGTH: usize = TYPE_LENGTH + TIMESTAMP_LENGTH + ADDRESS_LENGTH + AMOUNT_LENGTH;

impl GenesisTransactionData {
    /// SHA-256 of the encoded record, repeated to signature width.
    ///
    /// `None` if the recipient is not an encodable address.
    pub fn signature(&self) -> Option<Signature> {
        encode(self)
            .ok()
            .map(|bytes| Signature::from_bytes(derived_signature(&bytes)))
    }
}

pub(super) fn decode(r: &mut Reader<'_>) -> TransformResult<GenesisTransactionData> {
    let timestamp = r.read_i64()?;
    let recipient = r.read_address()?;
    let amount = r.read_amount()?;
    Ok(GenesisTransactionData {
        timestamp,
        recipient,
        amount,
    })
}

pub(super) fn encoded_length(_data: &GenesisTransactionData) -> usize {
    LENGTH
}

pub(super) fn encode(data: &GenesisTransactionData) -> TransformResult<Vec<u8>> {
    let mut w = Writer::with_capacity(LENGTH);
    w.write_i32(TransactionType::Genesis.value());
    w.write_i64(data.timestamp);
    w.write_address(&data.recipient)?;
    w.write_amount(data.amount);
    Ok(w.into_bytes())
}

pub(super) fn to_display(data: &GenesisTransactionData) -> Value {
    json!({
        "type": TransactionType::Genesis.value(),
        "fee": crate::amount::Amount::ZERO.to_string(),
        "timestamp": data.timestamp,
        "signature": data.signature().map(|s| s.to_base58()),
        "recipient": data.recipient,
        "amount": data.amount.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::config::ChainParams;
    use crate::crypto::address;
    use crate::data::TransactionData;
    use crate::transform;

    fn genesis() -> GenesisTransactionData {
        GenesisTransactionData {
            timestamp: 1_400_000_000_000,
            recipient: address::from_public_key(&[1; 32]),
            amount: Amount::from_coins(1_000),
        }
    }

    #[test]
    fn layout_is_fixed_width() {
        let data = TransactionData::Genesis(genesis());
        let params = ChainParams::default();
        let bytes = transform::encode(&data, &params).unwrap();
        assert_eq!(bytes.len(), 45);
        assert_eq!(transform::encoded_length(&data, &params), 45);
        assert_eq!(&bytes[..4], &1i32.to_be_bytes());
        assert_eq!(transform::decode(&bytes, &params).unwrap(), data);
    }

    #[test]
    fn derived_signature_tracks_content() {
        let a = genesis();
        let mut b = genesis();
        b.amount = Amount::from_coins(999);
        let sig = a.signature().unwrap();
        assert_eq!(&sig.as_bytes()[..32], &sig.as_bytes()[32..]);
        assert_eq!(a.signature(), genesis().signature());
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let params = ChainParams::default();
        let mut bytes = transform::encode(&TransactionData::Genesis(genesis()), &params).unwrap();
        bytes.push(0);
        assert!(transform::decode(&bytes, &params).is_err());
    }
}
