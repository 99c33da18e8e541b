//! # Transaction Transformers
//!
//! Canonical byte encoding of every supported transaction type, the byte
//! form used for signing, and a JSON projection for display.
//!
//! ```text
//! [type 4][timestamp 8][reference 64][type payload ...][fee 8][signature 64?]
//! ```
//!
//! All integers are big-endian. The signature is omitted, not zero-filled,
//! on unsigned records. Signing bytes are the encoding without the
//! signature, except for historical transactions whose type was signed
//! under an older layout. Those quirks live in the per-type modules as
//! separate legacy functions selected once per transaction by a
//! [`ChainParams`] predicate.
//!
//! Only the dispatcher functions in this module are public; each per-type
//! module exposes the same five functions to it.

mod at;
mod create_poll;
mod deploy_at;
mod genesis;
mod issue_asset;
mod multi_payment;
mod payment;
pub mod serialization;
mod transfer_asset;
mod vote_on_poll;

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{ChainParams, FEE_LENGTH, REFERENCE_LENGTH, SIGNATURE_LENGTH, TIMESTAMP_LENGTH, TYPE_LENGTH};
use crate::crypto::AddressError;
use crate::data::transaction::TransactionBase;
use crate::data::{Signature, TransactionData, TransactionType};
use serialization::{Reader, Writer};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Bytes that do not form a valid transaction, or a record that cannot be
/// encoded. Rejecting the frame is always the right response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformationError {
    #[error("transaction bytes too short: needed {needed}, {remaining} remaining")]
    TooShort { needed: usize, remaining: usize },

    #[error("unsupported transaction type {0}")]
    UnsupportedType(i32),

    #[error("{field} is {size} bytes, maximum is {max}")]
    SizeExceeded {
        field: &'static str,
        size: usize,
        max: usize,
    },

    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("asset amount does not fit in 64 bits: {0}")]
    AmountOutOfRange(String),

    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

pub type TransformResult<T> = Result<T, TransformationError>;

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Decode a full transaction, type tag first.
pub fn decode(bytes: &[u8], params: &ChainParams) -> TransformResult<TransactionData> {
    trace!(bytes = %hex::encode(bytes), "decoding transaction");
    let result = decode_tagged(bytes, params);
    if let Err(e) = &result {
        debug!(error = %e, len = bytes.len(), "rejected transaction bytes");
    }
    result
}

fn decode_tagged(bytes: &[u8], params: &ChainParams) -> TransformResult<TransactionData> {
    let mut reader = Reader::new(bytes);
    let tag = reader.read_i32()?;
    let transaction_type = TransactionType::from_value(tag)
        .filter(|t| t.is_supported())
        .ok_or(TransformationError::UnsupportedType(tag))?;

    let data = match transaction_type {
        TransactionType::Genesis => TransactionData::Genesis(genesis::decode(&mut reader)?),
        TransactionType::Payment => TransactionData::Payment(payment::decode(&mut reader)?),
        TransactionType::CreatePoll => {
            TransactionData::CreatePoll(create_poll::decode(&mut reader, params)?)
        }
        TransactionType::VoteOnPoll => TransactionData::VoteOnPoll(vote_on_poll::decode(&mut reader)?),
        TransactionType::IssueAsset => {
            TransactionData::IssueAsset(issue_asset::decode(&mut reader, params)?)
        }
        TransactionType::TransferAsset => {
            TransactionData::TransferAsset(transfer_asset::decode(&mut reader)?)
        }
        TransactionType::MultiPayment => {
            TransactionData::MultiPayment(multi_payment::decode(&mut reader)?)
        }
        TransactionType::DeployAt => TransactionData::DeployAt(deploy_at::decode(&mut reader)?),
        TransactionType::At => TransactionData::At(at::decode(&mut reader)?),
        other => return Err(TransformationError::UnsupportedType(other.value())),
    };
    reader.finish()?;
    Ok(data)
}

/// Exact length [`encode`] will produce for `data`.
pub fn encoded_length(data: &TransactionData, params: &ChainParams) -> usize {
    match data {
        TransactionData::Genesis(d) => genesis::encoded_length(d),
        TransactionData::Payment(d) => payment::encoded_length(d),
        TransactionData::CreatePoll(d) => create_poll::encoded_length(d, params),
        TransactionData::VoteOnPoll(d) => vote_on_poll::encoded_length(d),
        TransactionData::IssueAsset(d) => issue_asset::encoded_length(d, params),
        TransactionData::TransferAsset(d) => transfer_asset::encoded_length(d),
        TransactionData::MultiPayment(d) => multi_payment::encoded_length(d),
        TransactionData::DeployAt(d) => deploy_at::encoded_length(d),
        TransactionData::At(d) => at::encoded_length(d),
    }
}

pub fn encode(data: &TransactionData, params: &ChainParams) -> TransformResult<Vec<u8>> {
    match data {
        TransactionData::Genesis(d) => genesis::encode(d),
        TransactionData::Payment(d) => payment::encode(d),
        TransactionData::CreatePoll(d) => create_poll::encode(d, params),
        TransactionData::VoteOnPoll(d) => vote_on_poll::encode(d),
        TransactionData::IssueAsset(d) => issue_asset::encode(d, params),
        TransactionData::TransferAsset(d) => transfer_asset::encode(d),
        TransactionData::MultiPayment(d) => multi_payment::encode(d),
        TransactionData::DeployAt(d) => deploy_at::encode(d),
        TransactionData::At(d) => at::encode(d),
    }
}

/// The exact bytes that are signed and verified.
pub fn bytes_for_signing(data: &TransactionData, params: &ChainParams) -> TransformResult<Vec<u8>> {
    match data {
        TransactionData::Genesis(d) => genesis::encode(d),
        TransactionData::Payment(d) => payment::bytes_for_signing(d),
        TransactionData::CreatePoll(d) => create_poll::bytes_for_signing(d, params),
        TransactionData::VoteOnPoll(d) => vote_on_poll::bytes_for_signing(d),
        TransactionData::IssueAsset(d) => issue_asset::bytes_for_signing(d, params),
        TransactionData::TransferAsset(d) => transfer_asset::bytes_for_signing(d),
        TransactionData::MultiPayment(d) => multi_payment::bytes_for_signing(d, params),
        TransactionData::DeployAt(d) => deploy_at::bytes_for_signing(d),
        TransactionData::At(d) => at::bytes_for_signing(d),
    }
}

/// Human-readable projection. Not used for hashing or signing.
pub fn to_display_record(data: &TransactionData) -> Value {
    match data {
        TransactionData::Genesis(d) => genesis::to_display(d),
        TransactionData::Payment(d) => payment::to_display(d),
        TransactionData::CreatePoll(d) => create_poll::to_display(d),
        TransactionData::VoteOnPoll(d) => vote_on_poll::to_display(d),
        TransactionData::IssueAsset(d) => issue_asset::to_display(d),
        TransactionData::TransferAsset(d) => transfer_asset::to_display(d),
        TransactionData::MultiPayment(d) => multi_payment::to_display(d),
        TransactionData::DeployAt(d) => deploy_at::to_display(d),
        TransactionData::At(d) => at::to_display(d),
    }
}

// ---------------------------------------------------------------------------
// Shared layout helpers
// ---------------------------------------------------------------------------

/// Bytes every non-genesis type spends on type, timestamp, reference and fee.
const BASE_LENGTH: usize = TYPE_LENGTH + TIMESTAMP_LENGTH + REFERENCE_LENGTH + FEE_LENGTH;

fn signature_length(base: &TransactionBase) -> usize {
    if base.signature().is_some() {
        SIGNATURE_LENGTH
    } else {
        0
    }
}

fn write_header(w: &mut Writer, transaction_type: TransactionType, base: &TransactionBase) {
    w.write_i32(transaction_type.value());
    w.write_i64(base.timestamp);
    w.write_bytes(base.reference.as_bytes());
}

/// Append the signature, if any, to an already written body.
fn with_signature(mut body: Vec<u8>, base: &TransactionBase) -> Vec<u8> {
    if let Some(signature) = base.signature() {
        body.extend_from_slice(signature.as_bytes());
    }
    body
}

fn read_base_tail(
    r: &mut Reader<'_>,
    timestamp: i64,
    reference: Signature,
) -> TransformResult<TransactionBase> {
    let fee = r.read_amount()?;
    let signature = r.read_optional_signature()?;
    Ok(TransactionBase::with_optional_signature(timestamp, reference, fee, signature))
}

/// Common display fields merged with the type-specific ones.
fn display_record(transaction_type: TransactionType, base: &TransactionBase, fields: Value) -> Value {
    let mut record = Map::new();
    record.insert("type".into(), json!(transaction_type.value()));
    record.insert("fee".into(), json!(base.fee.to_string()));
    record.insert("timestamp".into(), json!(base.timestamp));
    record.insert("reference".into(), json!(base.reference.to_base58()));
    record.insert(
        "signature".into(),
        base.signature().map_or(Value::Null, |s| json!(s.to_base58())),
    );
    if let Value::Object(extra) = fields {
        record.extend(extra);
    }
    Value::Object(record)
}
