use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Answer of a price feed: `answer / 10^decimals` reference-currency units
/// per one whole native unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceData {
    pub answer: i128,
    pub decimals: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("Price feed reported a non-positive price: {answer}")]
    NonPositivePrice { answer: i128 },
    #[error("Price feed precision of {decimals} decimals is not supported")]
    UnsupportedDecimals { decimals: u8 },
    #[error("Price feed is unavailable: {0}")]
    Unavailable(String),
}

/// Read-only source of the native/reference exchange rate.
pub trait PriceOracle {
    fn latest_price(&self) -> Result<PriceData, OracleError>;
}

impl<T: PriceOracle + ?Sized> PriceOracle for &T {
    fn latest_price(&self) -> Result<PriceData, OracleError> {
        (**self).latest_price()
    }
}

impl<T: PriceOracle + ?Sized> PriceOracle for Arc<T> {
    fn latest_price(&self) -> Result<PriceData, OracleError> {
        (**self).latest_price()
    }
}

/// Settable feed for development networks and tests.
#[derive(Debug)]
pub struct MockPriceFeed {
    round: RwLock<PriceData>,
}

impl MockPriceFeed {
    pub const DEFAULT_DECIMALS: u8 = 8;
    /// 2000 reference units per native unit.
    pub const DEFAULT_ANSWER: i128 = 2000_00000000;

    pub fn new(decimals: u8, answer: i128) -> Self {
        Self {
            round: RwLock::new(PriceData { answer, decimals }),
        }
    }

    /// Replaces the current answer, keeping the precision.
    pub fn update_answer(&self, answer: i128) -> Result<(), OracleError> {
        let mut round = self
            .round
            .write()
            .map_err(|err| OracleError::Unavailable(err.to_string()))?;
        round.answer = answer;
        Ok(())
    }
}

impl Default for MockPriceFeed {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DECIMALS, Self::DEFAULT_ANSWER)
    }
}

impl PriceOracle for MockPriceFeed {
    fn latest_price(&self) -> Result<PriceData, OracleError> {
        self.round
            .read()
            .map(|round| *round)
            .map_err(|err| OracleError::Unavailable(err.to_string()))
    }
}
