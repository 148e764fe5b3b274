use thiserror::Error;

use crate::{
    address::Address, command::CommandError, ledger::LedgerError, transport::TransferError,
    units::Wei,
};

pub mod in_memory_processor;

/// Value sent from one account to another, with an optional call payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub from: Address,
    pub to: Address,
    pub value: Wei,
    pub data: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),
    #[error(transparent)]
    TransferErr(#[from] TransferError),
    #[error("Ledger at {ledger} cannot pay itself")]
    LedgerIsSender { ledger: Address },
    #[error("{account} holds {balance}, cannot pay {required}")]
    InsufficientNativeBalance {
        account: Address,
        balance: Wei,
        required: Wei,
    },
}

pub trait PaymentProcessor {
    /// Applies `payment` as one transaction: fully, or not at all.
    fn process_payment(&mut self, payment: Payment) -> Result<(), ProcessError>;
}
