use std::fs::File;

use anyhow::{Context, Result};
use fund_ledger::{
    bin_utils::{ReplayError, Service},
    config::LedgerConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let filename = std::env::args()
        .nth(1)
        .context("Expected a payments file name as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;
    let config = match std::env::args().nth(2) {
        Some(path) => LedgerConfig::load(&path)
            .with_context(|| format!("Failed to load config `{path}`"))?,
        None => LedgerConfig::default(),
    };

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        config,
        error_printer: Box::new(|line, err| {
            match err {
                ReplayError::Process(err) => {
                    // rejected payments are expected, not malformed input
                    tracing::info!(line, %err, "payment rejected")
                }
                err => eprintln!("Error at line {line}: {err}"),
            }
        }),
    };
    service.run()
}
