//! Fixed-point token amounts.
//!
//! An [`Amount`] counts base units with 18 decimal places. Values are never
//! negative; subtraction that would underflow returns `None` instead of
//! clamping. The canonical encoding is a 32-byte big-endian integer.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::{LedgerError, Result};

/// Number of decimal places carried by an [`Amount`].
pub const DECIMALS: u32 = 18;

/// Width of the canonical encoding in bytes.
pub const AMOUNT_WIDTH: usize = 32;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Amount(BigUint::zero())
    }

    /// One whole coin.
    pub fn coin() -> Self {
        Amount(BigUint::from(10u32).pow(DECIMALS))
    }

    /// `whole` coins plus `fraction` base units.
    pub fn new_coin(whole: u64, fraction: u64) -> Self {
        Amount(Self::coin().0 * BigUint::from(whole) + BigUint::from(fraction))
    }

    pub fn from_base_units(units: BigUint) -> Result<Self> {
        if units.bits() > (AMOUNT_WIDTH * 8) as u64 {
            return Err(LedgerError::AmountOverflow);
        }
        Ok(Amount(units))
    }

    pub fn base_units(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn less(&self, other: &Amount) -> bool {
        self < other
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount> {
        Self::from_base_units(&self.0 + &other.0)
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 < other.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }

    /// Converts a human decimal such as `3.9` into base units.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LedgerError::InvalidAmount(format!("{} is negative", value)));
        }
        let normalized = value.normalize();
        let scale = normalized.scale();
        if scale > DECIMALS {
            return Err(LedgerError::InvalidAmount(format!(
                "{} has more than {} decimal places",
                value, DECIMALS
            )));
        }
        let mantissa = normalized.mantissa().unsigned_abs();
        let units = BigUint::from(mantissa) * BigUint::from(10u32).pow(DECIMALS - scale);
        Self::from_base_units(units)
    }

    fn to_be_fixed(&self) -> [u8; AMOUNT_WIDTH] {
        let digits = self.0.to_bytes_be();
        let mut out = [0u8; AMOUNT_WIDTH];
        // width is enforced at construction
        out[AMOUNT_WIDTH - digits.len()..].copy_from_slice(&digits);
        out
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coin = Self::coin().0;
        let whole = &self.0 / &coin;
        let frac = (&self.0 % &coin).to_u64().unwrap_or_default();
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let frac = format!("{:0width$}", frac, width = DECIMALS as usize);
        write!(f, "{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self)
    }
}

impl FromStr for Amount {
    type Err = LedgerError;
    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| LedgerError::InvalidAmount(format!("'{}': {}", s, e)))?;
        Self::from_decimal(value)
    }
}

impl CanonicalSerialize for Amount {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_be_fixed())
    }
}

impl CanonicalDeserialize for Amount {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        let bytes: [u8; AMOUNT_WIDTH] = reader.take_array()?;
        Ok(Amount(BigUint::from_bytes_be(&bytes)))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let a: Amount = "3.9".parse().unwrap();
        assert_eq!(a, Amount::new_coin(3, 900_000_000_000_000_000));
        assert_eq!(a.to_string(), "3.9");
        assert_eq!(Amount::new_coin(5, 0).to_string(), "5");
        assert_eq!("0.000000000000000001".parse::<Amount>().unwrap().to_string(), "0.000000000000000001");
    }

    #[test]
    fn test_rejects_negative_and_excess_precision() {
        assert!("-1".parse::<Amount>().is_err());
        assert!("0.0000000000000000001".parse::<Amount>().is_err());
    }

    #[test]
    fn test_sub_never_goes_negative() {
        let one = Amount::coin();
        let two = Amount::new_coin(2, 0);
        assert!(one.checked_sub(&two).is_none());
        assert_eq!(two.checked_sub(&one), Some(one.clone()));
        assert!(one.less(&two));
    }

    #[test]
    fn test_fixed_width_encoding() {
        let a = Amount::new_coin(1, 0);
        let bytes = a.to_bytes();
        assert_eq!(bytes.len(), AMOUNT_WIDTH);
        let (decoded, used) = Amount::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, a);
        assert_eq!(used, AMOUNT_WIDTH);
        assert_eq!(Amount::zero().to_bytes(), vec![0u8; AMOUNT_WIDTH]);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let max = Amount::from_base_units((BigUint::from(1u8) << 256) - 1u8).unwrap();
        assert!(matches!(max.checked_add(&Amount::new_coin(0, 1)), Err(LedgerError::AmountOverflow)));
        assert!(Amount::from_base_units(BigUint::from(1u8) << 256).is_err());
    }
}
