//! Fixed-point amounts.
//!
//! Balances, fees and payment amounts are exact decimals with eight
//! fractional digits. They are held as an `i64` count of 10^-8 units so
//! that no floating point ever comes near a balance. Amounts are signed:
//! net balance deltas reported by the engine are negative for payers.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AMOUNT_DECIMALS;

/// Units per whole coin: 10^8.
pub const UNITS_PER_COIN: i64 = 100_000_000;

/// Errors from parsing a decimal string into an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("invalid digit in amount {0:?}")]
    InvalidDigit(String),

    #[error("amount {0:?} has more than 8 fractional digits")]
    TooPrecise(String),

    #[error("amount {0:?} is out of range")]
    OutOfRange(String),
}

/// An exact decimal amount with eight fractional digits.
///
/// # Examples
///
/// ```
/// use ledger_protocol::amount::Amount;
///
/// let fee: Amount = "1".parse().unwrap();
/// let sent = Amount::from_coins(30);
/// assert_eq!((sent + fee).to_string(), "31.00000000");
/// assert_eq!(Amount::from_units(150_000_000).to_string(), "1.50000000");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Wraps a raw count of 10^-8 units.
    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Whole coins, with no fractional part.
    pub const fn from_coins(coins: i64) -> Self {
        Self(coins * UNITS_PER_COIN)
    }

    /// The raw count of 10^-8 units.
    pub const fn units(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// True if the amount has no fractional part. Non-divisible assets only
    /// accept integral amounts.
    pub fn is_integral(self) -> bool {
        self.0 % UNITS_PER_COIN == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    /// Plain decimal string, always with eight fractional digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_coin = UNITS_PER_COIN as u64;
        write!(
            f,
            "{}{}.{:0>width$}",
            sign,
            abs / per_coin,
            abs % per_coin,
            width = AMOUNT_DECIMALS as usize
        )
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Empty);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountError::InvalidDigit(s.to_string()));
        }

        // Trailing zeros beyond the eighth digit carry no precision.
        let frac = frac.trim_end_matches('0');
        if frac.len() > AMOUNT_DECIMALS as usize {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let out_of_range = || AmountError::OutOfRange(s.to_string());

        let whole_units = if whole.is_empty() {
            0i64
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| out_of_range())?
                .checked_mul(UNITS_PER_COIN)
                .ok_or_else(out_of_range)?
        };

        let frac_units = if frac.is_empty() {
            0i64
        } else {
            let padded = format!("{:0<width$}", frac, width = AMOUNT_DECIMALS as usize);
            padded.parse::<i64>().map_err(|_| out_of_range())?
        };

        let units = whole_units
            .checked_add(frac_units)
            .ok_or_else(out_of_range)?;

        Ok(Amount(if negative { -units } else { units }))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, other: Amount) {
        self.0 += other.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, other: Amount) -> Amount {
        Amount(self.0 - other.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, other: Amount) {
        self.0 -= other.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_always_has_eight_decimals() {
        assert_eq!(Amount::ZERO.to_string(), "0.00000000");
        assert_eq!(Amount::from_coins(100).to_string(), "100.00000000");
        assert_eq!(Amount::from_units(1).to_string(), "0.00000001");
        assert_eq!(Amount::from_units(-150_000_000).to_string(), "-1.50000000");
    }

    #[test]
    fn parse_plain_strings() {
        assert_eq!("69".parse::<Amount>().unwrap(), Amount::from_coins(69));
        assert_eq!("0.5".parse::<Amount>().unwrap(), Amount::from_units(50_000_000));
        assert_eq!(".25".parse::<Amount>().unwrap(), Amount::from_units(25_000_000));
        assert_eq!("-3.00000001".parse::<Amount>().unwrap(), Amount::from_units(-300_000_001));
        assert_eq!("1.1000000000".parse::<Amount>().unwrap(), Amount::from_units(110_000_000));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert_eq!(".".parse::<Amount>(), Err(AmountError::Empty));
        assert!(matches!("1e5".parse::<Amount>(), Err(AmountError::InvalidDigit(_))));
        assert!(matches!("0.000000001".parse::<Amount>(), Err(AmountError::TooPrecise(_))));
        assert!(matches!(
            "99999999999999999999".parse::<Amount>(),
            Err(AmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn integral_detection() {
        assert!(Amount::from_coins(3).is_integral());
        assert!(!Amount::from_units(300_000_001).is_integral());
        assert!(Amount::from_coins(-2).is_integral());
    }

    #[test]
    fn arithmetic() {
        let a = Amount::from_coins(100);
        let b = Amount::from_coins(31);
        assert_eq!(a - b, Amount::from_coins(69));
        assert_eq!(-(a - b), Amount::from_coins(-69));
        assert_eq!(vec![a, b].into_iter().sum::<Amount>(), Amount::from_coins(131));
        assert_eq!(Amount::from_units(i64::MAX).checked_add(Amount::from_units(1)), None);
    }
}
