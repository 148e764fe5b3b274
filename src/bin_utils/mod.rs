//! Replays a CSV list of payments against a freshly deployed ledger and
//! prints where the value ended up. Shared by the binary and the integration
//! tests.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::{
    config::LedgerConfig,
    processor::{PaymentProcessor, ProcessError},
    units,
};
use csv_parser::{CsvPaymentParser, RowError};
use csv_printer::{AccountSummary, print_accounts};
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Malformed row: {0}")]
    Row(#[from] csv::Error),
    #[error(transparent)]
    Payment(#[from] RowError),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub config: LedgerConfig,
    pub error_printer: Box<dyn FnMut(u64, ReplayError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvPaymentParser::new(self.input);
        let mut network = self
            .config
            .build_network()
            .context("Failed to deploy ledger from config")?;
        let ledger_address = network.ledger_address();

        for (line, row) in parser {
            let result = row
                .map_err(ReplayError::from)
                .and_then(|row| Ok(row.into_payment(ledger_address)?))
                .and_then(|payment| Ok(network.process_payment(payment)?));
            if let Err(err) = result {
                (self.error_printer)(line, err);
            }
        }
        info!(
            total = network.ledger.total_balance(),
            funders = network.ledger.funders().len(),
            "replay finished"
        );

        let mut summaries = Vec::new();
        for (account, native) in network.accounts.iter() {
            summaries.push(AccountSummary {
                account: *account,
                native: units::from_fixed(*native)?,
                contributed: units::from_fixed(network.ledger.balance_of(account))?,
            });
        }
        print_accounts(self.output, summaries.into_iter())
    }
}
