use thiserror::Error;

use crate::units::Wei;

/// Payload prefix of an explicit `fund()` call.
pub const FUND_SELECTOR: [u8; 4] = [0xb6, 0x0d, 0x42, 0x88];
/// Payload prefix of an explicit `withdraw()` call.
pub const WITHDRAW_SELECTOR: [u8; 4] = [0x3c, 0xcf, 0xd6, 0x0b];

/// What a payment addressed to the ledger asks it to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCall {
    Fund,
    Withdraw,
    /// Plain value transfer without payload.
    Receive,
    /// Payload that matches no known call.
    Fallback,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("{call:?} does not accept native value, got {value}")]
    NonPayable { call: LedgerCall, value: Wei },
}

impl LedgerCall {
    pub fn parse_call(payload: &[u8], value: Wei) -> Result<Self, CommandError> {
        if payload.is_empty() {
            return Ok(Self::Receive);
        }
        let call = match payload.get(..4) {
            Some(selector) if *selector == FUND_SELECTOR => Self::Fund,
            Some(selector) if *selector == WITHDRAW_SELECTOR => Self::Withdraw,
            _ => Self::Fallback,
        };
        if call == Self::Withdraw && value > 0 {
            return Err(CommandError::NonPayable { call, value });
        }
        Ok(call)
    }

    /// Receive and fallback are accounted exactly like an explicit `fund()`.
    pub fn routes_to_fund(self) -> bool {
        matches!(self, Self::Fund | Self::Receive | Self::Fallback)
    }
}
