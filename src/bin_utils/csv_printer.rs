use std::io::Write;

use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::address::Address;

/// Final state of one account after a replay, amounts in whole units.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub account: Address,
    pub native: Decimal,
    pub contributed: Decimal,
}

pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountSummary>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        if let Err(err) = writer.serialize(acc) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_header_and_rows() {
        let mut output = Vec::new();
        print_accounts(
            &mut output,
            [AccountSummary {
                account: Address::repeat_byte(1),
                native: Decimal::new(995, 2),
                contributed: Decimal::new(5, 2),
            }]
            .into_iter(),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "account,native,contributed\n0x0101010101010101010101010101010101010101,9.95,0.05\n"
        );
    }
}
