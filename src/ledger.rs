use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    address::Address,
    converter,
    oracle::{OracleError, PriceOracle},
    transport::{TransferError, Transport},
    units::{WEI_PER_ETHER, Wei},
};

/// Minimum contribution, 50 reference units in 18-decimal fixed point.
pub const DEFAULT_MINIMUM_USD: u128 = 50 * WEI_PER_ETHER;

/// Notification emitted once per successful state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Fund { funder: Address, amount: Wei },
    /// `amount` is the escrow drained by the withdrawal, read before the reset.
    Withdraw { owner: Address, amount: Wei },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Contribution of {amount} is worth {usd_value}, below the minimum of {minimum}")]
    InsufficientContribution {
        amount: Wei,
        usd_value: u128,
        minimum: u128,
    },
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("{caller} is not the owner of the ledger")]
    Unauthorized { caller: Address },
    #[error("Ledger holds no funds to withdraw")]
    NothingToWithdraw,
    #[error("Payout failed: {0}")]
    TransferFailed(#[from] TransferError),
    #[error("Ledger has no funders yet")]
    NoFunders,
    #[error("Crediting {amount} would overflow the ledger balance")]
    BalanceOverflow { amount: Wei },
}

/// Crowdfunding ledger.
///
/// Every contribution is checked against the price oracle, escrowed and
/// recorded per funder. The owner drains the whole escrow with
/// [`FundLedger::withdraw`], which resets all bookkeeping.
///
/// `funders` keeps one entry per accepted contribution, so repeat funders show
/// up several times and the list grows with the number of calls until the
/// next withdrawal.
#[derive(Debug)]
pub struct FundLedger<O> {
    owner: Address,
    oracle: O,
    minimum_usd: u128,
    balances: HashMap<Address, Wei>,
    funders: Vec<Address>,
    total_balance: Wei,
    events: Vec<LedgerEvent>,
}

impl<O> FundLedger<O>
where
    O: PriceOracle,
{
    pub fn new(owner: Address, oracle: O) -> Self {
        Self::with_minimum(owner, oracle, DEFAULT_MINIMUM_USD)
    }

    pub fn with_minimum(owner: Address, oracle: O, minimum_usd: u128) -> Self {
        Self {
            owner,
            oracle,
            minimum_usd,
            balances: HashMap::new(),
            funders: Vec::new(),
            total_balance: 0,
            events: Vec::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn minimum_usd(&self) -> u128 {
        self.minimum_usd
    }

    pub fn balance_of(&self, funder: &Address) -> Wei {
        self.balances.get(funder).copied().unwrap_or_default()
    }

    pub fn balances(&self) -> impl Iterator<Item = (&Address, &Wei)> {
        self.balances.iter()
    }

    pub fn funders(&self) -> &[Address] {
        &self.funders
    }

    pub fn total_balance(&self) -> Wei {
        self.total_balance
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Accepts `amount` from `caller` if it is worth at least the minimum.
    ///
    /// The caller's value is considered escrowed once this returns `Ok`.
    pub fn fund(&mut self, caller: Address, amount: Wei) -> Result<(), LedgerError> {
        let event = self.handle_fund(caller, amount).inspect_err(|err| {
            debug!(%caller, amount, %err, "contribution rejected");
        })?;
        self.apply(&event);
        info!(funder = %caller, amount, total = self.total_balance, "contribution accepted");
        self.events.push(event);
        Ok(())
    }

    /// Pays the whole escrow out to the owner and clears the bookkeeping.
    ///
    /// Nothing changes unless `transport` reports the payout as done.
    pub fn withdraw<T>(&mut self, caller: Address, mut transport: T) -> Result<(), LedgerError>
    where
        T: Transport,
    {
        let event = self.handle_withdraw(caller).inspect_err(|err| {
            debug!(%caller, %err, "withdrawal rejected");
        })?;
        if let LedgerEvent::Withdraw { owner, amount } = event {
            transport.send(owner, amount).inspect_err(|err| {
                warn!(%owner, amount, %err, "payout failed, escrow kept");
            })?;
        }
        self.apply(&event);
        info!(owner = %self.owner, "ledger drained");
        self.events.push(event);
        Ok(())
    }

    /// Funder with the greatest cumulative balance.
    ///
    /// Ties go to whoever funded first.
    pub fn highest_funder(&self) -> Result<Address, LedgerError> {
        let mut highest: Option<(Address, Wei)> = None;
        for funder in &self.funders {
            let balance = self.balance_of(funder);
            if highest.is_none_or(|(_, max)| balance > max) {
                highest = Some((*funder, balance));
            }
        }
        highest
            .map(|(funder, _)| funder)
            .ok_or(LedgerError::NoFunders)
    }

    fn handle_fund(&self, caller: Address, amount: Wei) -> Result<LedgerEvent, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InsufficientContribution {
                amount,
                usd_value: 0,
                minimum: self.minimum_usd,
            });
        }
        let price = self.oracle.latest_price()?;
        let usd_value = converter::usd_value(amount, price)?;
        if usd_value < self.minimum_usd {
            return Err(LedgerError::InsufficientContribution {
                amount,
                usd_value,
                minimum: self.minimum_usd,
            });
        }
        // per-funder balances never exceed the total, so checking it covers both
        if self.total_balance.checked_add(amount).is_none() {
            return Err(LedgerError::BalanceOverflow { amount });
        }
        Ok(LedgerEvent::Fund {
            funder: caller,
            amount,
        })
    }

    fn handle_withdraw(&self, caller: Address) -> Result<LedgerEvent, LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized { caller });
        }
        if self.total_balance == 0 {
            return Err(LedgerError::NothingToWithdraw);
        }
        Ok(LedgerEvent::Withdraw {
            owner: self.owner,
            amount: self.total_balance,
        })
    }

    fn apply(&mut self, event: &LedgerEvent) {
        match *event {
            LedgerEvent::Fund { funder, amount } => {
                *self.balances.entry(funder).or_default() += amount;
                self.funders.push(funder);
                self.total_balance += amount;
            }
            LedgerEvent::Withdraw { .. } => {
                self.balances.clear();
                self.funders.clear();
                self.total_balance = 0;
            }
        }
    }
}
