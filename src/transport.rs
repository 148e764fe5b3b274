use thiserror::Error;

use crate::{address::Address, units::Wei};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Recipient {to} does not accept native value")]
    Rejected { to: Address },
    #[error("Transfer source holds {available}, cannot send {amount}")]
    InsufficientFunds { available: Wei, amount: Wei },
    #[error("Crediting {amount} to {to} would overflow its balance")]
    Overflow { to: Address, amount: Wei },
}

/// Settlement primitive that moves native value out of the ledger's escrow.
///
/// A call either moves the whole amount or returns an error with nothing moved.
pub trait Transport {
    fn send(&mut self, to: Address, amount: Wei) -> Result<(), TransferError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, to: Address, amount: Wei) -> Result<(), TransferError> {
        (**self).send(to, amount)
    }
}
