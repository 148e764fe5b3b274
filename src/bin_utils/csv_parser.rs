use std::io::Read;

use csv::{DeserializeRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    address::Address,
    command::{FUND_SELECTOR, WITHDRAW_SELECTOR},
    processor::Payment,
    units::{self, UnitsError},
};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    /// Explicit `fund()` call.
    Fund,
    /// Explicit `withdraw()` call, never carries value.
    Withdraw,
    /// Plain value transfer to the ledger, optionally with raw `data`.
    Transfer,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRow {
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    pub account: Address,
    pub amount: Option<Decimal>,
    pub data: Option<String>,
}

#[derive(Debug, Error)]
pub enum RowError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: PaymentKind },
    #[error(transparent)]
    Amount(#[from] UnitsError),
    #[error("Data is not valid hex: {0}")]
    Data(#[from] hex::FromHexError),
}

impl PaymentRow {
    pub fn into_payment(self, ledger: Address) -> Result<Payment, RowError> {
        let value = match (self.kind, self.amount) {
            (PaymentKind::Withdraw, amount) => amount.map(units::to_fixed).transpose()?,
            (kind, None) => return Err(RowError::AmountRequired { kind }),
            (_, Some(amount)) => Some(units::to_fixed(amount)?),
        };
        let data = match self.kind {
            PaymentKind::Fund => FUND_SELECTOR.to_vec(),
            PaymentKind::Withdraw => WITHDRAW_SELECTOR.to_vec(),
            PaymentKind::Transfer => match self.data.as_deref().map(str::trim) {
                None | Some("") => Vec::new(),
                Some(data) => hex::decode(data.strip_prefix("0x").unwrap_or(data))?,
            },
        };
        Ok(Payment {
            from: self.account,
            to: ledger,
            value: value.unwrap_or_default(),
            data,
        })
    }
}

/// Reads payment rows from CSV with a `type,account,amount,data` header.
pub struct CsvPaymentParser<R> {
    iter: DeserializeRecordsIntoIter<R, PaymentRow>,
}

impl<R> CsvPaymentParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvPaymentParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<PaymentRow>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}

#[cfg(test)]
mod tests {
    use crate::units::WEI_PER_ETHER;

    use super::*;

    const LEDGER: Address = Address::repeat_byte(0xf0);

    #[test]
    fn parse_rows() {
        let input = "type,account,amount,data
fund, 0x0101010101010101010101010101010101010101, 0.05
withdraw, 0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa,
transfer, 0x0202020202020202020202020202020202020202, 1, 0x1234
";
        let rows: Vec<_> = CsvPaymentParser::new(input.as_bytes())
            .map(|(line, row)| (line, row.unwrap().into_payment(LEDGER).unwrap()))
            .collect();
        assert_eq!(rows.len(), 3);

        let (_, fund) = &rows[0];
        assert_eq!(fund.from, Address::repeat_byte(1));
        assert_eq!(fund.to, LEDGER);
        assert_eq!(fund.value, WEI_PER_ETHER / 20);
        assert_eq!(fund.data, FUND_SELECTOR);

        let (_, withdraw) = &rows[1];
        assert_eq!(withdraw.value, 0);
        assert_eq!(withdraw.data, WITHDRAW_SELECTOR);

        let (_, transfer) = &rows[2];
        assert_eq!(transfer.value, WEI_PER_ETHER);
        assert_eq!(transfer.data, vec![0x12, 0x34]);
    }

    #[test]
    fn reject_incomplete_rows() {
        let input = "type,account,amount,data
fund,0x0101010101010101010101010101010101010101,
transfer,0x0101010101010101010101010101010101010101,1,0xzz
";
        let errors: Vec<_> = CsvPaymentParser::new(input.as_bytes())
            .map(|(_, row)| row.unwrap().into_payment(LEDGER).unwrap_err())
            .collect();
        assert!(matches!(
            errors[0],
            RowError::AmountRequired {
                kind: PaymentKind::Fund
            }
        ));
        assert!(matches!(errors[1], RowError::Data(_)));
    }
}
