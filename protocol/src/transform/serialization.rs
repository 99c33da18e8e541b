//! Big-endian primitives shared by every transaction codec.
//!
//! Strings and byte blobs are written as a 4-byte length followed by the
//! bytes. Declared lengths are checked against both the field's maximum
//! size and the bytes actually left, so a hostile length prefix cannot
//! trigger a large allocation.

use super::{TransformResult, TransformationError};
use crate::amount::Amount;
use crate::config::{
    ADDRESS_LENGTH, AMOUNT_LENGTH, ASSET_AMOUNT_LENGTH, INT_LENGTH, LONG_LENGTH, PUBLIC_KEY_LENGTH,
    SIGNATURE_LENGTH,
};
use crate::crypto::address;
use crate::data::{PaymentData, PublicKey, Signature};

/// Encoded size of one payment leg: recipient, asset id, 12-byte amount.
pub const PAYMENT_LENGTH: usize = ADDRESS_LENGTH + LONG_LENGTH + ASSET_AMOUNT_LENGTH;

/// Encoded size of a length-prefixed field holding `len` bytes.
pub fn sized_length(len: usize) -> usize {
    INT_LENGTH + len
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over an encoded transaction.
pub struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn take(&mut self, n: usize) -> TransformResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(TransformationError::TooShort {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> TransformResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> TransformResult<i32> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> TransformResult<i64> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> TransformResult<u64> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    pub fn read_u8(&mut self) -> TransformResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self, field: &'static str) -> TransformResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(TransformationError::InvalidValue {
                field,
                reason: format!("expected 0 or 1, got {}", other),
            }),
        }
    }

    pub fn read_signature(&mut self) -> TransformResult<Signature> {
        Ok(Signature::from_bytes(self.take_array::<SIGNATURE_LENGTH>()?))
    }

    pub fn read_public_key(&mut self) -> TransformResult<PublicKey> {
        self.take_array::<PUBLIC_KEY_LENGTH>()
    }

    pub fn read_address(&mut self) -> TransformResult<String> {
        let raw = self.take_array::<ADDRESS_LENGTH>()?;
        Ok(address::from_bytes(&raw)?)
    }

    pub fn read_amount(&mut self) -> TransformResult<Amount> {
        Ok(Amount::from_units(self.read_i64()?))
    }

    /// A 12-byte sign-extended amount, as used inside payment legs.
    pub fn read_asset_amount(&mut self) -> TransformResult<Amount> {
        let raw = self.take_array::<ASSET_AMOUNT_LENGTH>()?;
        let (high, low) = raw.split_at(ASSET_AMOUNT_LENGTH - AMOUNT_LENGTH);
        let mut low_bytes = [0u8; AMOUNT_LENGTH];
        low_bytes.copy_from_slice(low);
        let units = i64::from_be_bytes(low_bytes);
        let extension = if units < 0 { 0xFF } else { 0x00 };
        if high.iter().any(|b| *b != extension) {
            return Err(TransformationError::AmountOutOfRange(hex::encode(raw)));
        }
        Ok(Amount::from_units(units))
    }

    fn read_length(&mut self, field: &'static str, max: usize) -> TransformResult<usize> {
        let declared = self.read_i32()?;
        let len = usize::try_from(declared).map_err(|_| TransformationError::InvalidValue {
            field,
            reason: format!("negative length {}", declared),
        })?;
        if len > max {
            return Err(TransformationError::SizeExceeded { field, size: len, max });
        }
        Ok(len)
    }

    pub fn read_sized_bytes(&mut self, field: &'static str, max: usize) -> TransformResult<Vec<u8>> {
        let len = self.read_length(field, max)?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_sized_string(&mut self, field: &'static str, max: usize) -> TransformResult<String> {
        let bytes = self.read_sized_bytes(field, max)?;
        String::from_utf8(bytes).map_err(|_| TransformationError::InvalidUtf8 { field })
    }

    /// A count prefix bounded by `max`.
    pub fn read_count(&mut self, field: &'static str, max: usize) -> TransformResult<usize> {
        self.read_length(field, max)
    }

    pub fn read_payment(&mut self) -> TransformResult<PaymentData> {
        let recipient = self.read_address()?;
        let asset_id = self.read_u64()?;
        let amount = self.read_asset_amount()?;
        Ok(PaymentData::new(recipient, asset_id, amount))
    }

    /// The trailing signature, which unsigned records simply omit.
    pub fn read_optional_signature(&mut self) -> TransformResult<Option<Signature>> {
        match self.remaining() {
            0 => Ok(None),
            SIGNATURE_LENGTH => Ok(Some(self.read_signature()?)),
            n if n < SIGNATURE_LENGTH => Err(TransformationError::TooShort {
                needed: SIGNATURE_LENGTH,
                remaining: n,
            }),
            n => Err(TransformationError::TrailingBytes(n - SIGNATURE_LENGTH)),
        }
    }

    pub fn finish(&self) -> TransformResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(TransformationError::TrailingBytes(n)),
        }
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn write_address(&mut self, addr: &str) -> TransformResult<()> {
        let raw = address::to_bytes(addr)?;
        self.bytes.extend_from_slice(&raw);
        Ok(())
    }

    pub fn write_amount(&mut self, amount: Amount) {
        self.write_i64(amount.units());
    }

    pub fn write_asset_amount(&mut self, amount: Amount) {
        let extension = if amount.is_negative() { 0xFF } else { 0x00 };
        self.bytes
            .extend_from_slice(&[extension; ASSET_AMOUNT_LENGTH - AMOUNT_LENGTH]);
        self.write_i64(amount.units());
    }

    fn write_length(&mut self, field: &'static str, len: usize, max: usize) -> TransformResult<()> {
        if len > max {
            return Err(TransformationError::SizeExceeded { field, size: len, max });
        }
        let len = i32::try_from(len).map_err(|_| TransformationError::SizeExceeded {
            field,
            size: len,
            max: i32::MAX as usize,
        })?;
        self.write_i32(len);
        Ok(())
    }

    pub fn write_sized_bytes(&mut self, field: &'static str, bytes: &[u8], max: usize) -> TransformResult<()> {
        self.write_length(field, bytes.len(), max)?;
        self.write_bytes(bytes);
        Ok(())
    }

    pub fn write_sized_string(&mut self, field: &'static str, s: &str, max: usize) -> TransformResult<()> {
        self.write_sized_bytes(field, s.as_bytes(), max)
    }

    pub fn write_count(&mut self, field: &'static str, count: usize, max: usize) -> TransformResult<()> {
        self.write_length(field, count, max)
    }

    pub fn write_payment(&mut self, payment: &PaymentData) -> TransformResult<()> {
        self.write_address(&payment.recipient)?;
        self.write_u64(payment.asset_id);
        self.write_asset_amount(payment.amount);
        Ok(())
    }

    pub fn write_optional_signature(&mut self, signature: Option<&Signature>) {
        if let Some(signature) = signature {
            self.write_bytes(signature.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_amount_is_sign_extended() {
        let mut w = Writer::with_capacity(24);
        w.write_asset_amount(Amount::from_units(-2));
        w.write_asset_amount(Amount::from_units(300));
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..4], &[0xFF; 4]);
        assert_eq!(&bytes[12..16], &[0x00; 4]);

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_asset_amount().unwrap(), Amount::from_units(-2));
        assert_eq!(r.read_asset_amount().unwrap(), Amount::from_units(300));
        assert!(r.finish().is_ok());
    }

    #[test]
    fn oversized_asset_amount_is_rejected() {
        let mut raw = [0u8; ASSET_AMOUNT_LENGTH];
        raw[0] = 1;
        assert!(matches!(
            Reader::new(&raw).read_asset_amount(),
            Err(TransformationError::AmountOutOfRange(_))
        ));
    }

    #[test]
    fn sized_string_enforces_max_on_both_sides() {
        let mut w = Writer::with_capacity(16);
        w.write_sized_string("name", "abcd", 4).unwrap();
        assert!(matches!(
            w.write_sized_string("name", "abcde", 4),
            Err(TransformationError::SizeExceeded { size: 5, max: 4, .. })
        ));

        let bytes = w.into_bytes();
        assert_eq!(Reader::new(&bytes).read_sized_string("name", 4).unwrap(), "abcd");
        assert!(matches!(
            Reader::new(&bytes).read_sized_string("name", 3),
            Err(TransformationError::SizeExceeded { .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut w = Writer::with_capacity(8);
        w.write_sized_bytes("name", &[0xC3, 0x28], 10).unwrap();
        let bytes = w.into_bytes();
        assert!(matches!(
            Reader::new(&bytes).read_sized_string("name", 10),
            Err(TransformationError::InvalidUtf8 { field: "name" })
        ));
    }

    #[test]
    fn negative_and_overlong_lengths_are_rejected() {
        let negative = (-1i32).to_be_bytes();
        assert!(matches!(
            Reader::new(&negative).read_sized_bytes("blob", 10),
            Err(TransformationError::InvalidValue { .. })
        ));

        let overlong = 8i32.to_be_bytes();
        assert!(matches!(
            Reader::new(&overlong).read_sized_bytes("blob", 10),
            Err(TransformationError::TooShort { needed: 8, remaining: 0 })
        ));
    }

    #[test]
    fn optional_signature_accepts_absent_or_exact() {
        assert_eq!(Reader::new(&[]).read_optional_signature().unwrap(), None);
        let sig = [4u8; 64];
        assert_eq!(
            Reader::new(&sig).read_optional_signature().unwrap(),
            Some(Signature::from_bytes(sig))
        );
        assert!(Reader::new(&sig[..10]).read_optional_signature().is_err());
        assert!(Reader::new(&[0u8; 70]).read_optional_signature().is_err());
    }

    #[test]
    fn booleans_must_be_zero_or_one() {
        assert!(Reader::new(&[1]).read_bool("flag").unwrap());
        assert!(Reader::new(&[2]).read_bool("flag").is_err());
    }
}
