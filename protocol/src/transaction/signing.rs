//! Transaction signing and signature verification.
//!
//! Signing is a separate step from building because the keypair may not be
//! available when the record is assembled. The signed message is always
//! [`transform::bytes_for_signing`], including its legacy layouts, so a
//! record signed under an old protocol version keeps verifying.
//!
//! Genesis and AT records are never key-signed. Their signature is derived
//! from their own bytes.

use super::TransactionError;
use crate::account::PublicKeyAccount;
use crate::config::ChainParams;
use crate::crypto::{derived_signature, Keypair};
use crate::data::{Signature, TransactionData};
use crate::transform;

/// Sign an unsigned record with `keypair`, returning the signed copy.
///
/// The keypair must belong to the record's creator.
pub fn sign(
    data: &TransactionData,
    keypair: &Keypair,
    params: &ChainParams,
) -> Result<TransactionData, TransactionError> {
    let transaction_type = data.transaction_type();
    let creator_key = data
        .creator_public_key()
        .ok_or(TransactionError::NotKeySigned(transaction_type))?;
    if data.is_signed() {
        return Err(TransactionError::AlreadySigned(transaction_type));
    }
    if *creator_key != keypair.public_key() {
        return Err(TransactionError::KeyMismatch);
    }

    let message = transform::bytes_for_signing(data, params)?;
    let signature = Signature::from_bytes(keypair.sign(&message));
    Ok(data.clone().with_signature(signature))
}

/// Attach the derived signature to an AT settlement. Genesis records derive
/// theirs on demand and are returned unchanged.
pub fn with_derived_signature(
    data: &TransactionData,
    params: &ChainParams,
) -> Result<TransactionData, TransactionError> {
    match data {
        TransactionData::Genesis(_) => Ok(data.clone()),
        TransactionData::At(_) => {
            let unsigned = data.without_signature();
            let message = transform::bytes_for_signing(&unsigned, params)?;
            Ok(unsigned.with_signature(Signature::from_bytes(derived_signature(&message))))
        }
        other => Err(TransactionError::NotKeySigned(other.transaction_type())),
    }
}

/// True if the record's signature matches its signing bytes.
///
/// Unsigned records are reported as `false`, not as an error.
pub fn is_signature_valid(data: &TransactionData, params: &ChainParams) -> Result<bool, TransactionError> {
    let signature = match data {
        TransactionData::Genesis(_) => return Ok(true),
        other => match other.signature() {
            Some(signature) => signature,
            None => return Ok(false),
        },
    };
    let message = transform::bytes_for_signing(data, params)?;

    match data.creator_public_key() {
        Some(public_key) => Ok(PublicKeyAccount::new(*public_key).verify(&signature, &message)),
        None => Ok(signature.as_bytes() == &derived_signature(&message)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::crypto::address;
    use crate::data::transaction::{AtPayment, AtTransactionData, PaymentTransactionData, TransactionBase};

    fn params() -> ChainParams {
        ChainParams::all_released()
    }

    fn payment_from(keypair: &Keypair) -> TransactionData {
        TransactionData::Payment(PaymentTransactionData {
            base: TransactionBase::new(
                1_700_000_000_000,
                Signature::from_bytes([7; 64]),
                Amount::from_coins(1),
            ),
            sender_public_key: keypair.public_key(),
            recipient: address::from_public_key(&[4; 32]),
            amount: Amount::from_coins(30),
        })
    }

    fn settlement() -> TransactionData {
        TransactionData::At(AtTransactionData {
            base: TransactionBase::new(1_700_000_000_000, Signature::from_bytes([3; 64]), Amount::from_units(500)),
            at_address: address::at_address_from_seed(b"deploy"),
            recipient: address::from_public_key(&[4; 32]),
            payment: Some(AtPayment {
                asset_id: 0,
                amount: Amount::from_coins(2),
            }),
            message: b"payout".to_vec(),
        })
    }

    #[test]
    fn signed_payment_verifies() {
        let keypair = Keypair::generate();
        let signed = sign(&payment_from(&keypair), &keypair, &params()).unwrap();
        assert!(signed.is_signed());
        assert!(is_signature_valid(&signed, &params()).unwrap());
    }

    #[test]
    fn signing_is_deterministic() {
        let keypair = Keypair::from_seed(&[11; 32]);
        let unsigned = payment_from(&keypair);
        let a = sign(&unsigned, &keypair, &params()).unwrap();
        let b = sign(&unsigned, &keypair, &params()).unwrap();
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn tampered_payment_fails_verification() {
        let keypair = Keypair::generate();
        let signed = sign(&payment_from(&keypair), &keypair, &params()).unwrap();
        let tampered = match signed {
            TransactionData::Payment(mut p) => {
                p.amount = Amount::from_coins(31);
                TransactionData::Payment(p)
            }
            _ => unreachable!(),
        };
        assert!(!is_signature_valid(&tampered, &params()).unwrap());
    }

    #[test]
    fn refuses_to_re_sign() {
        let keypair = Keypair::generate();
        let signed = sign(&payment_from(&keypair), &keypair, &params()).unwrap();
        assert!(matches!(
            sign(&signed, &keypair, &params()),
            Err(TransactionError::AlreadySigned(_))
        ));
    }

    #[test]
    fn refuses_a_foreign_keypair() {
        let owner = Keypair::generate();
        let stranger = Keypair::generate();
        assert!(matches!(
            sign(&payment_from(&owner), &stranger, &params()),
            Err(TransactionError::KeyMismatch)
        ));
    }

    #[test]
    fn unsigned_record_is_not_valid() {
        let keypair = Keypair::generate();
        assert!(!is_signature_valid(&payment_from(&keypair), &params()).unwrap());
    }

    #[test]
    fn at_settlement_carries_a_derived_signature() {
        let keypair = Keypair::generate();
        assert!(matches!(
            sign(&settlement(), &keypair, &params()),
            Err(TransactionError::NotKeySigned(_))
        ));

        let derived = with_derived_signature(&settlement(), &params()).unwrap();
        assert!(derived.is_signed());
        assert!(is_signature_valid(&derived, &params()).unwrap());

        let again = with_derived_signature(&derived, &params()).unwrap();
        assert_eq!(derived.signature(), again.signature());
    }
}
