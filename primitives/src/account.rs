//! Ledger accounts as seen by the ewasm host.

use serde::{Deserialize, Serialize};

use crate::error::{CallError, ErrorCode};
use crate::types::Address;

/// A ledger account.
///
/// `wasm_code` is empty for plain value-holding accounts; a non-empty body
/// marks the account as a deployed ewasm contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub balance: u64,
    pub wasm_code: Vec<u8>,
}

impl Account {
    /// Create an empty account at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Create an account holding `balance`.
    pub fn with_balance(address: Address, balance: u64) -> Self {
        Self {
            address,
            balance,
            ..Self::default()
        }
    }

    pub fn has_code(&self) -> bool {
        !self.wasm_code.is_empty()
    }

    /// Credit `amount`. Fails without modifying the balance on overflow.
    pub fn add_to_balance(&mut self, amount: u64) -> Result<(), CallError> {
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            CallError::new(
                ErrorCode::IntegerOverflow,
                format!("adding {} to balance {} overflows", amount, self.balance),
            )
        })?;
        Ok(())
    }

    /// Debit `amount`. Fails without modifying the balance if insufficient.
    pub fn subtract_from_balance(&mut self, amount: u64) -> Result<(), CallError> {
        self.balance = self.balance.checked_sub(amount).ok_or_else(|| {
            CallError::new(
                ErrorCode::InsufficientBalance,
                format!("balance {} is less than {}", self.balance, amount),
            )
        })?;
        Ok(())
    }
}
