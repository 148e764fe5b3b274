use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    address::Address,
    command::LedgerCall,
    ledger::FundLedger,
    oracle::PriceOracle,
    transport::{TransferError, Transport},
    units::Wei,
};

use super::{Payment, PaymentProcessor, ProcessError};

/// Native balances of every account known to the network.
#[derive(Debug, Default)]
pub struct NativeAccounts {
    balances: HashMap<Address, Wei>,
    non_payable: HashSet<Address>,
}

/// A validated transfer, holding the balances both sides end up with.
#[derive(Debug)]
#[must_use]
pub struct PendingTransfer {
    from: (Address, Wei),
    to: (Address, Wei),
}

impl NativeAccounts {
    pub fn balance_of(&self, account: &Address) -> Wei {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn set_balance(&mut self, account: Address, balance: Wei) {
        self.balances.insert(account, balance);
    }

    /// Accounts marked non-payable reject every incoming transfer.
    pub fn set_payable(&mut self, account: Address, payable: bool) {
        if payable {
            self.non_payable.remove(&account);
        } else {
            self.non_payable.insert(account);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Wei)> {
        self.balances.iter()
    }

    /// Checks a transfer without moving anything.
    pub fn prepare(
        &self,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<PendingTransfer, TransferError> {
        if self.non_payable.contains(&to) {
            return Err(TransferError::Rejected { to });
        }
        let available = self.balance_of(&from);
        let Some(from_balance) = available.checked_sub(amount) else {
            return Err(TransferError::InsufficientFunds { available, amount });
        };
        if from == to {
            return Ok(PendingTransfer {
                from: (from, available),
                to: (to, available),
            });
        }
        let to_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(TransferError::Overflow { to, amount })?;
        Ok(PendingTransfer {
            from: (from, from_balance),
            to: (to, to_balance),
        })
    }

    pub fn commit(&mut self, transfer: PendingTransfer) {
        let (from, from_balance) = transfer.from;
        let (to, to_balance) = transfer.to;
        self.balances.insert(from, from_balance);
        self.balances.insert(to, to_balance);
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: Wei) -> Result<(), TransferError> {
        let transfer = self.prepare(from, to, amount)?;
        self.commit(transfer);
        Ok(())
    }
}

/// Pays out of the native balance held at the ledger's address.
struct Escrow<'a> {
    address: Address,
    accounts: &'a mut NativeAccounts,
}

impl Transport for Escrow<'_> {
    fn send(&mut self, to: Address, amount: Wei) -> Result<(), TransferError> {
        self.accounts.transfer(self.address, to, amount)
    }
}

/// Single ledger deployment on an in-memory settlement layer.
///
/// Payments to the ledger's address are routed into the ledger, all other
/// payments just move native value between accounts.
#[derive(Debug)]
pub struct InMemoryNetwork<O> {
    ledger_address: Address,
    pub ledger: FundLedger<O>,
    pub accounts: NativeAccounts,
}

impl<O> InMemoryNetwork<O>
where
    O: PriceOracle,
{
    pub fn new(ledger_address: Address, ledger: FundLedger<O>) -> Self {
        Self {
            ledger_address,
            ledger,
            accounts: NativeAccounts::default(),
        }
    }

    pub fn ledger_address(&self) -> Address {
        self.ledger_address
    }

    pub fn native_balance(&self, account: &Address) -> Wei {
        self.accounts.balance_of(account)
    }

    fn call_ledger(&mut self, payment: Payment) -> Result<(), ProcessError> {
        // escrow cannot be paid into itself, the ledger would count value it already holds
        if payment.from == self.ledger_address {
            return Err(ProcessError::LedgerIsSender {
                ledger: self.ledger_address,
            });
        }
        let call = LedgerCall::parse_call(&payment.data, payment.value)?;
        debug!(from = %payment.from, ?call, value = payment.value, "routing payment to ledger");
        if call.routes_to_fund() {
            // validate the escrow move first so the ledger never records value it did not get
            let escrow = self
                .accounts
                .prepare(payment.from, self.ledger_address, payment.value)?;
            self.ledger.fund(payment.from, payment.value)?;
            self.accounts.commit(escrow);
        } else {
            let escrow = Escrow {
                address: self.ledger_address,
                accounts: &mut self.accounts,
            };
            self.ledger.withdraw(payment.from, escrow)?;
        }
        Ok(())
    }
}

impl<O> PaymentProcessor for InMemoryNetwork<O>
where
    O: PriceOracle,
{
    fn process_payment(&mut self, payment: Payment) -> Result<(), ProcessError> {
        let balance = self.accounts.balance_of(&payment.from);
        if balance < payment.value {
            return Err(ProcessError::InsufficientNativeBalance {
                account: payment.from,
                balance,
                required: payment.value,
            });
        }
        if payment.to == self.ledger_address {
            self.call_ledger(payment)
        } else {
            self.accounts
                .transfer(payment.from, payment.to, payment.value)?;
            Ok(())
        }
    }
}
