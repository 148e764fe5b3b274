//! Native to reference-currency conversion.
//!
//! All values are integers. A native amount is in wei (18 decimals) and the
//! converted value is reference currency at the same 18-decimal scale, so a
//! minimum of 50 USD is `50 * 10^18`.

use primitive_types::U256;

use crate::{
    oracle::{OracleError, PriceData},
    units::Wei,
};

/// Reference-currency value of `amount`, in 18-decimal fixed point.
///
/// The product is taken in 256 bits, so the result is exact. Values above
/// `u128::MAX` saturate, which still compares above any `u128` minimum.
pub fn usd_value(amount: Wei, price: PriceData) -> Result<u128, OracleError> {
    if price.answer <= 0 {
        return Err(OracleError::NonPositivePrice {
            answer: price.answer,
        });
    }
    let Some(scale) = 10u128.checked_pow(price.decimals.into()) else {
        return Err(OracleError::UnsupportedDecimals {
            decimals: price.decimals,
        });
    };
    // both factors are below 2^128, the product always fits
    let value = U256::from(amount) * U256::from(price.answer.unsigned_abs()) / U256::from(scale);
    if value > U256::from(u128::MAX) {
        Ok(u128::MAX)
    } else {
        Ok(value.low_u128())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::WEI_PER_ETHER;

    const ETH_2000: PriceData = PriceData {
        answer: 2000_00000000,
        decimals: 8,
    };

    #[test]
    fn convert_with_feed_precision() {
        assert_eq!(usd_value(WEI_PER_ETHER, ETH_2000).unwrap(), 2000 * WEI_PER_ETHER);
        // 0.01 ether
        assert_eq!(
            usd_value(WEI_PER_ETHER / 100, ETH_2000).unwrap(),
            20 * WEI_PER_ETHER
        );
        // 1 wei is worth 2000 "usd-wei"
        assert_eq!(usd_value(1, ETH_2000).unwrap(), 2000);

        let eighteen = PriceData {
            answer: 1600 * WEI_PER_ETHER as i128,
            decimals: 18,
        };
        assert_eq!(
            usd_value(WEI_PER_ETHER / 100, eighteen).unwrap(),
            16 * WEI_PER_ETHER
        );

        let zero_decimals = PriceData {
            answer: 3,
            decimals: 0,
        };
        assert_eq!(usd_value(7, zero_decimals).unwrap(), 21);
    }

    #[test]
    fn value_around_minimum() {
        let minimum = 50 * WEI_PER_ETHER;
        // exactly 50 usd: 0.025 ether at 2000
        assert_eq!(usd_value(25 * WEI_PER_ETHER / 1000, ETH_2000).unwrap(), minimum);
        assert!(usd_value(25 * WEI_PER_ETHER / 1000 - 1, ETH_2000).unwrap() < minimum);
        assert!(usd_value(WEI_PER_ETHER / 1_000_000, ETH_2000).unwrap() < minimum);
    }

    #[test]
    fn huge_amounts_saturate() {
        assert_eq!(usd_value(u128::MAX, ETH_2000).unwrap(), u128::MAX);
    }

    #[test]
    fn eighteen_decimal_feed_keeps_fractional_amounts_exact() {
        let feed = PriceData {
            answer: 2000 * WEI_PER_ETHER as i128,
            decimals: 18,
        };
        // 0.9 ether, remainder times answer is far beyond u128
        assert_eq!(
            usd_value(9 * WEI_PER_ETHER / 10, feed).unwrap(),
            1800 * WEI_PER_ETHER
        );
        assert_eq!(
            usd_value(WEI_PER_ETHER + 1, feed).unwrap(),
            2000 * WEI_PER_ETHER + 2000
        );
    }

    #[test]
    fn reject_unusable_prices() {
        let err = usd_value(
            WEI_PER_ETHER,
            PriceData {
                answer: 0,
                decimals: 8,
            },
        )
        .unwrap_err();
        assert_eq!(err, OracleError::NonPositivePrice { answer: 0 });

        let err = usd_value(
            WEI_PER_ETHER,
            PriceData {
                answer: -5,
                decimals: 8,
            },
        )
        .unwrap_err();
        assert_eq!(err, OracleError::NonPositivePrice { answer: -5 });

        let err = usd_value(
            WEI_PER_ETHER,
            PriceData {
                answer: 1,
                decimals: 39,
            },
        )
        .unwrap_err();
        assert_eq!(err, OracleError::UnsupportedDecimals { decimals: 39 });
    }
}
