use std::{fs, path::Path};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    address::Address,
    ledger::FundLedger,
    oracle::MockPriceFeed,
    processor::in_memory_processor::InMemoryNetwork,
    units::{self, UnitsError},
};

/// First account of a local development node, deploys the ledger.
pub const DEFAULT_OWNER: Address = Address::new([
    0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82, 0x72, 0x79, 0xcf,
    0xff, 0xb9, 0x22, 0x66,
]);

/// Where the ledger lands when deployed right after the price feed mock.
pub const DEFAULT_LEDGER_ADDRESS: Address = Address::new([
    0xe7, 0xf1, 0x72, 0x5e, 0x77, 0x34, 0xce, 0x28, 0x8f, 0x83, 0x67, 0xe1, 0xbb, 0x14, 0x3e, 0x90,
    0xbb, 0x3f, 0x05, 0x12,
]);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid `{field}`: {source}")]
    Amount {
        field: &'static str,
        source: UnitsError,
    },
    #[error("Price feed seed must be positive, got {answer}")]
    NonPositivePrice { answer: i128 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceFeedConfig {
    pub decimals: u8,
    pub answer: i128,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            decimals: MockPriceFeed::DEFAULT_DECIMALS,
            answer: MockPriceFeed::DEFAULT_ANSWER,
        }
    }
}

/// Native balance an account starts with, in whole units.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenesisAccount {
    pub address: Address,
    pub balance: Decimal,
}

/// Deployment parameters of a ledger on the in-memory network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub owner: Address,
    pub ledger_address: Address,
    /// Minimum contribution in whole reference-currency units.
    pub minimum_usd: Decimal,
    pub price_feed: PriceFeedConfig,
    pub accounts: Vec<GenesisAccount>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER,
            ledger_address: DEFAULT_LEDGER_ADDRESS,
            minimum_usd: Decimal::from(50),
            price_feed: PriceFeedConfig::default(),
            accounts: Vec::new(),
        }
    }
}

impl LedgerConfig {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Minimum in 18-decimal fixed point, the scale the ledger compares at.
    pub fn minimum_usd_fixed(&self) -> Result<u128, ConfigError> {
        units::to_fixed(self.minimum_usd).map_err(|source| ConfigError::Amount {
            field: "minimum_usd",
            source,
        })
    }

    /// Deploys a fresh ledger backed by a mock feed and seeds genesis balances.
    pub fn build_network(&self) -> Result<InMemoryNetwork<MockPriceFeed>, ConfigError> {
        if self.price_feed.answer <= 0 {
            return Err(ConfigError::NonPositivePrice {
                answer: self.price_feed.answer,
            });
        }
        let feed = MockPriceFeed::new(self.price_feed.decimals, self.price_feed.answer);
        let ledger = FundLedger::with_minimum(self.owner, feed, self.minimum_usd_fixed()?);
        let mut network = InMemoryNetwork::new(self.ledger_address, ledger);
        for account in &self.accounts {
            let balance =
                units::to_fixed(account.balance).map_err(|source| ConfigError::Amount {
                    field: "accounts.balance",
                    source,
                })?;
            network.accounts.set_balance(account.address, balance);
        }
        Ok(network)
    }
}
