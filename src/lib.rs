pub mod address;

/// Native unit scale and exact decimal conversions for I/O.
pub mod units;

/// Price feed interface and a settable mock feed.
pub mod oracle;

/// Integer fixed-point conversion of native amounts into reference currency.
pub mod converter;

/// Settlement primitive used to pay the collected funds out.
pub mod transport;

/// Crowdfunding ledger: contributions, owner withdrawal and highest funder.
/// State is modified using events, which are created by handling calls
pub mod ledger;

/// Decodes payment payloads into ledger calls, see [`command::LedgerCall`].
pub mod command;

/// Payment processor interface, plus "in memory" settlement network.
/// Routes payments into the [`ledger`] and keeps native balances of accounts.
pub mod processor;

/// Deployment parameters, loaded from JSON.
pub mod config;

/// CSV replay of payments, used by the binary and by integration tests.
pub mod bin_utils;
