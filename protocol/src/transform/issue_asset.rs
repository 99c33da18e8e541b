//! Issue-asset:
//!
//! ```text
//! [header][issuer key 32][owner 25][name][description][quantity 8][divisible 1]
//! [asset reference 64, legacy only][fee][sig]
//! ```
//!
//! Before issue-asset v2 the encoding embedded the asset reference, which
//! is the transaction's own signature (zeros while unsigned). Legacy
//! signing bytes therefore have that block zeroed.

use serde_json::{json, Value};

use super::serialization::{sized_length, Reader, Writer};
use super::{
    display_record, read_base_tail, signature_length, with_signature, write_header, TransformResult,
    TransformationError, BASE_LENGTH,
};
use crate::config::{
    ChainParams, ADDRESS_LENGTH, BOOLEAN_LENGTH, LONG_LENGTH, MAX_ASSET_DESCRIPTION_SIZE,
    MAX_ASSET_NAME_SIZE, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};
use crate::crypto::address;
use crate::data::transaction::IssueAssetTransactionData;
use crate::data::TransactionType;

const UNSIGNED_REFERENCE: [u8; SIGNATURE_LENGTH] = [0; SIGNATURE_LENGTH];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Legacy,
    Current,
}

fn layout(timestamp: i64, params: &ChainParams) -> Layout {
    if params.is_legacy_issue_asset(timestamp) {
        Layout::Legacy
    } else {
        Layout::Current
    }
}

/// The asset reference a legacy encoding embeds for `data`.
fn asset_reference(data: &IssueAssetTransactionData) -> [u8; SIGNATURE_LENGTH] {
    data.base
        .signature()
        .map_or(UNSIGNED_REFERENCE, |s| *s.as_bytes())
}

pub(super) fn decode(r: &mut Reader<'_>, params: &ChainParams) -> TransformResult<IssueAssetTransactionData> {
    let timestamp = r.read_i64()?;
    let layout = layout(timestamp, params);
    let reference = r.read_signature()?;
    let issuer_public_key = r.read_public_key()?;
    let owner = r.read_address()?;
    let asset_name = r.read_sized_string("asset name", MAX_ASSET_NAME_SIZE)?;
    let description = r.read_sized_string("asset description", MAX_ASSET_DESCRIPTION_SIZE)?;
    let quantity = r.read_i64()?;
    let is_divisible = r.read_bool("asset divisibility")?;
    let embedded_reference = match layout {
        Layout::Legacy => Some(r.read_signature()?),
        Layout::Current => None,
    };
    let base = read_base_tail(r, timestamp, reference)?;

    let data = IssueAssetTransactionData {
        base,
        issuer_public_key,
        owner,
        asset_name,
        description,
        quantity,
        is_divisible,
        asset_id: None,
    };
    if let Some(embedded) = embedded_reference {
        if *embedded.as_bytes() != asset_reference(&data) {
            return Err(TransformationError::InvalidValue {
                field: "asset reference",
                reason: "does not match the transaction signature".to_string(),
            });
        }
    }
    Ok(data)
}

fn unsigned_length(data: &IssueAssetTransactionData, layout: Layout) -> usize {
    let embedded = match layout {
        Layout::Legacy => SIGNATURE_LENGTH,
        Layout::Current => 0,
    };
    BASE_LENGTH
        + PUBLIC_KEY_LENGTH
        + ADDRESS_LENGTH
        + sized_length(data.asset_name.len())
        + sized_length(data.description.len())
        + LONG_LENGTH
        + BOOLEAN_LENGTH
        + embedded
}

pub(super) fn encoded_length(data: &IssueAssetTransactionData, params: &ChainParams) -> usize {
    unsigned_length(data, layout(data.base.timestamp, params)) + signature_length(&data.base)
}

fn write_unsigned(
    data: &IssueAssetTransactionData,
    embedded_reference: Option<&[u8; SIGNATURE_LENGTH]>,
) -> TransformResult<Vec<u8>> {
    let layout = if embedded_reference.is_some() {
        Layout::Legacy
    } else {
        Layout::Current
    };
    let mut w = Writer::with_capacity(unsigned_length(data, layout));
    write_header(&mut w, TransactionType::IssueAsset, &data.base);
    w.write_bytes(&data.issuer_public_key);
    w.write_address(&data.owner)?;
    w.write_sized_string("asset name", &data.asset_name, MAX_ASSET_NAME_SIZE)?;
    w.write_sized_string("asset description", &data.description, MAX_ASSET_DESCRIPTION_SIZE)?;
    w.write_i64(data.quantity);
    w.write_bool(data.is_divisible);
    if let Some(embedded) = embedded_reference {
        w.write_bytes(embedded);
    }
    w.write_amount(data.base.fee);
    Ok(w.into_bytes())
}

fn encode_legacy_unsigned(data: &IssueAssetTransactionData) -> TransformResult<Vec<u8>> {
    write_unsigned(data, Some(&asset_reference(data)))
}

fn encode_current_unsigned(data: &IssueAssetTransactionData) -> TransformResult<Vec<u8>> {
    write_unsigned(data, None)
}

/// Legacy signing bytes: the legacy encoding with the asset reference zeroed.
fn legacy_signing_bytes(data: &IssueAssetTransactionData) -> TransformResult<Vec<u8>> {
    write_unsigned(data, Some(&UNSIGNED_REFERENCE))
}

pub(super) fn bytes_for_signing(
    data: &IssueAssetTransactionData,
    params: &ChainParams,
) -> TransformResult<Vec<u8>> {
    match layout(data.base.timestamp, params) {
        Layout::Legacy => legacy_signing_bytes(data),
        Layout::Current => encode_current_unsigned(data),
    }
}

pub(super) fn encode(data: &IssueAssetTransactionData, params: &ChainParams) -> TransformResult<Vec<u8>> {
    let unsigned = match layout(data.base.timestamp, params) {
        Layout::Legacy => encode_legacy_unsigned(data)?,
        Layout::Current => encode_current_unsigned(data)?,
    };
    Ok(with_signature(unsigned, &data.base))
}

pub(super) fn to_display(data: &IssueAssetTransactionData) -> Value {
    display_record(
        TransactionType::IssueAsset,
        &data.base,
        json!({
            "issuer": address::from_public_key(&data.issuer_public_key),
            "issuerPublicKey": hex::encode(data.issuer_public_key),
            "owner": data.owner,
            "name": data.asset_name,
            "description": data.description,
            "quantity": data.quantity,
            "isDivisible": data.is_divisible,
            "assetId": data.asset_id,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::data::transaction::TransactionBase;
    use crate::data::{Signature, TransactionData};

    fn issue(timestamp: i64) -> IssueAssetTransactionData {
        IssueAssetTransactionData {
            base: TransactionBase::new(timestamp, Signature::from_bytes([5; 64]), Amount::from_coins(1)),
            issuer_public_key: [6; 32],
            owner: address::from_public_key(&[6; 32]),
            asset_name: "gold".to_string(),
            description: "shiny".to_string(),
            quantity: 1_000,
            is_divisible: false,
            asset_id: None,
        }
    }

    fn signed(data: IssueAssetTransactionData) -> IssueAssetTransactionData {
        match TransactionData::IssueAsset(data).with_signature(Signature::from_bytes([0xAA; 64])) {
            TransactionData::IssueAsset(d) => d,
            _ => unreachable!(),
        }
    }

    #[test]
    fn legacy_encoding_embeds_the_signature() {
        let params = ChainParams::default();
        let data = signed(issue(params.issue_asset_v2_timestamp - 1));
        let bytes = encode(&data, &params).unwrap();
        let fee_and_sig = 8 + 64;
        let embedded = &bytes[bytes.len() - fee_and_sig - 64..bytes.len() - fee_and_sig];
        assert_eq!(embedded, &[0xAA; 64][..]);
        assert_eq!(encoded_length(&data, &params), bytes.len());

        let mut r = Reader::new(&bytes[4..]);
        assert_eq!(decode(&mut r, &params).unwrap(), data);
    }

    #[test]
    fn legacy_signing_bytes_zero_the_asset_reference() {
        let params = ChainParams::default();
        let data = signed(issue(params.issue_asset_v2_timestamp - 1));
        let signing = bytes_for_signing(&data, &params).unwrap();
        let start = signing.len() - 64 - 8;
        assert_eq!(&signing[start..start + 64], &[0u8; 64][..]);

        // Identical to what the unsigned record encodes to.
        let unsigned = issue(params.issue_asset_v2_timestamp - 1);
        assert_eq!(signing, encode(&unsigned, &params).unwrap());
    }

    #[test]
    fn mismatched_embedded_reference_is_rejected() {
        let params = ChainParams::default();
        let data = signed(issue(params.issue_asset_v2_timestamp - 1));
        let mut bytes = encode(&data, &params).unwrap();
        let at = bytes.len() - 8 - 64 - 64;
        bytes[at] ^= 0xFF;
        let mut r = Reader::new(&bytes[4..]);
        assert!(decode(&mut r, &params).is_err());
    }

    #[test]
    fn current_layout_has_no_embedded_reference() {
        let params = ChainParams::default();
        let legacy = issue(params.issue_asset_v2_timestamp - 1);
        let current = issue(params.issue_asset_v2_timestamp);
        assert_eq!(
            encoded_length(&legacy, &params),
            encoded_length(&current, &params) + 64
        );
    }
}
