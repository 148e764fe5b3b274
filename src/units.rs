//! Native amounts are integers in the smallest unit (wei), 18 decimals per ether.
//! Decimal values only show up when reading or printing human amounts.

use rust_decimal::Decimal;
use thiserror::Error;

/// Decimal places of the native currency.
pub const NATIVE_DECIMALS: u32 = 18;

/// Smallest native units in one whole unit.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

pub type Wei = u128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Amount must not be negative: {0}")]
    Negative(Decimal),
    #[error("Amount {0} has more than 18 fractional digits")]
    TooPrecise(Decimal),
    #[error("Amount {0} does not fit into native units")]
    Overflow(Decimal),
}

/// Converts a whole-unit decimal (e.g. `0.05`) into 18-decimal fixed point.
pub fn to_fixed(amount: Decimal) -> Result<u128, UnitsError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(UnitsError::Negative(amount));
    }
    let normalized = amount.normalize();
    if normalized.scale() > NATIVE_DECIMALS {
        return Err(UnitsError::TooPrecise(amount));
    }
    let mantissa = normalized.mantissa().unsigned_abs();
    10u128
        .checked_pow(NATIVE_DECIMALS - normalized.scale())
        .and_then(|factor| mantissa.checked_mul(factor))
        .ok_or(UnitsError::Overflow(amount))
}

/// Inverse of [`to_fixed`]. Fails only for values beyond what [`Decimal`] can hold.
pub fn from_fixed(amount: u128) -> Result<Decimal, UnitsError> {
    let Ok(value) = i128::try_from(amount) else {
        return Err(UnitsError::Overflow(Decimal::MAX));
    };
    Decimal::try_from_i128_with_scale(value, NATIVE_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|_| UnitsError::Overflow(Decimal::MAX))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn to_fixed_amounts() {
        assert_eq!(
            to_fixed(Decimal::from_str("0.05").unwrap()).unwrap(),
            50_000_000_000_000_000
        );
        assert_eq!(to_fixed(Decimal::ONE).unwrap(), WEI_PER_ETHER);
        assert_eq!(to_fixed(Decimal::ZERO).unwrap(), 0);
        // trailing zeros beyond 18 places are fine
        assert_eq!(
            to_fixed(Decimal::from_str("1.0000000000000000000000").unwrap()).unwrap(),
            WEI_PER_ETHER
        );
    }

    #[test]
    fn to_fixed_rejects_bad_amounts() {
        let negative = Decimal::from_str("-1").unwrap();
        assert_eq!(to_fixed(negative), Err(UnitsError::Negative(negative)));

        let precise = Decimal::from_str("0.0000000000000000001").unwrap();
        assert_eq!(to_fixed(precise), Err(UnitsError::TooPrecise(precise)));
    }

    #[test]
    fn from_fixed_amounts() {
        assert_eq!(
            from_fixed(10_000_000_000_000_000).unwrap(),
            Decimal::from_str("0.01").unwrap()
        );
        assert_eq!(from_fixed(0).unwrap().to_string(), "0");
        assert_eq!(from_fixed(3 * WEI_PER_ETHER).unwrap().to_string(), "3");
    }
}
