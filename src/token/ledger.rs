//! Account ledger
//!
//! Per-account balances and the aggregate supply. All arithmetic is
//! checked, and every write records the replaced value in the undo
//! journal so a failed operation can be rolled back.

use crate::core::{Address, Journal};
use crate::token::error::TokenError;
use crate::token::event::TokenEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Undo entry for a ledger write
#[derive(Debug, Clone)]
pub enum LedgerChange {
    /// `prev` is `None` when the account had no entry yet
    Balance { account: Address, prev: Option<u128> },
    Supply(u128),
}

/// Balances and total supply
///
/// Absent accounts read as zero. Writing zero keeps the entry, which is
/// not observable through any query.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountLedger {
    balances: HashMap<Address, u128>,
    total_supply: u128,
    #[serde(skip)]
    journal: Journal<LedgerChange>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Accounts holding a non-zero balance
    pub fn holders(&self) -> Vec<(&Address, u128)> {
        let mut holders: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, &b)| b > 0)
            .map(|(a, &b)| (a, b))
            .collect();
        holders.sort();
        holders
    }

    /// Sum of every stored balance (checked, for invariant tests)
    pub fn sum_of_balances(&self) -> Option<u128> {
        self.balances
            .values()
            .try_fold(0u128, |acc, &b| acc.checked_add(b))
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Create `amount` and credit it to `to`
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<TokenEvent, TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddressTarget);
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.set_supply(new_supply);
        self.set_balance(to, new_balance);

        Ok(TokenEvent::transfer(&Address::zero(), to, amount))
    }

    /// Move `amount` from `from` to `to`
    ///
    /// A self-transfer debits then credits the same account, so it nets
    /// to zero but still passes every check and still produces an event.
    pub fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TokenEvent, TokenError> {
        if from.is_zero() {
            return Err(TokenError::ZeroAddressSource);
        }
        if to.is_zero() {
            return Err(TokenError::ZeroAddressTarget);
        }
        self.ensure_balance(from, amount)?;

        let new_from = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance)?;
        self.set_balance(from, new_from);

        // Read after the debit so self-transfers see the debited value
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.set_balance(to, new_to);

        Ok(TokenEvent::transfer(from, to, amount))
    }

    /// Destroy `amount` of `who`'s balance
    ///
    /// Returns the burn-specific event followed by the generic transfer
    /// to the zero address.
    pub fn burn_from_account(
        &mut self,
        who: &Address,
        amount: u128,
    ) -> Result<[TokenEvent; 2], TokenError> {
        self.ensure_balance(who, amount)?;

        let new_balance = self
            .balance_of(who)
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance)?;
        let new_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;

        self.set_balance(who, new_balance);
        self.set_supply(new_supply);

        Ok([
            TokenEvent::burn(who, amount),
            TokenEvent::transfer(who, &Address::zero(), amount),
        ])
    }

    pub fn ensure_balance(&self, who: &Address, amount: u128) -> Result<(), TokenError> {
        if self.balance_of(who) < amount {
            return Err(TokenError::InsufficientBalance);
        }
        Ok(())
    }

    // =========================================================================
    // Journal
    // =========================================================================

    pub(crate) fn checkpoint(&self) -> usize {
        self.journal.len()
    }

    pub(crate) fn revert_to(&mut self, checkpoint: usize) {
        let undo: Vec<_> = self.journal.unwind(checkpoint).collect();
        for change in undo {
            match change {
                LedgerChange::Balance {
                    account,
                    prev: Some(prev),
                } => {
                    self.balances.insert(account, prev);
                }
                LedgerChange::Balance {
                    account,
                    prev: None,
                } => {
                    self.balances.remove(&account);
                }
                LedgerChange::Supply(prev) => self.total_supply = prev,
            }
        }
    }

    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    fn set_balance(&mut self, account: &Address, value: u128) {
        let prev = self.balances.insert(account.clone(), value);
        self.journal.record(LedgerChange::Balance {
            account: account.clone(),
            prev,
        });
    }

    fn set_supply(&mut self, value: u128) {
        let prev = std::mem::replace(&mut self.total_supply, value);
        self.journal.record(LedgerChange::Supply(prev));
    }
}
