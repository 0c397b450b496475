//! Allowance store
//!
//! Spending limits granted by an owner to a spender. `u128::MAX` is the
//! unlimited sentinel: consuming from it never writes.

use crate::core::{Address, Journal};
use crate::token::error::TokenError;
use crate::token::event::TokenEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Allowance value that is never decremented
pub const UNLIMITED_ALLOWANCE: u128 = u128::MAX;

/// Undo entry for an allowance write
#[derive(Debug, Clone)]
pub struct AllowanceChange {
    owner: Address,
    spender: Address,
    prev: Option<u128>,
}

/// Allowances: owner -> (spender -> amount)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AllowanceStore {
    allowances: HashMap<Address, HashMap<Address, u128>>,
    #[serde(skip)]
    journal: Journal<AllowanceChange>,
}

impl AllowanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrite the allowance (last write wins)
    pub fn set_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<TokenEvent, TokenError> {
        if spender.is_zero() {
            return Err(TokenError::ZeroAddressSpender);
        }
        if owner.is_zero() {
            return Err(TokenError::ZeroAddressOwner);
        }

        self.write(owner, spender, amount);
        Ok(TokenEvent::approval(owner, spender, amount))
    }

    /// Spend `amount` of the allowance `owner` granted to `spender`
    ///
    /// No event is produced on this path.
    pub fn consume_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        let current = self.allowance(owner, spender);
        if current == UNLIMITED_ALLOWANCE {
            return Ok(());
        }
        if current < amount {
            return Err(TokenError::InsufficientAllowance);
        }

        let remaining = current
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance)?;
        self.write(owner, spender, remaining);
        Ok(())
    }

    pub(crate) fn checkpoint(&self) -> usize {
        self.journal.len()
    }

    pub(crate) fn revert_to(&mut self, checkpoint: usize) {
        let undo: Vec<_> = self.journal.unwind(checkpoint).collect();
        for change in undo {
            match change.prev {
                Some(prev) => {
                    self.allowances
                        .entry(change.owner)
                        .or_default()
                        .insert(change.spender, prev);
                }
                None => {
                    if let Some(spenders) = self.allowances.get_mut(&change.owner) {
                        spenders.remove(&change.spender);
                        if spenders.is_empty() {
                            self.allowances.remove(&change.owner);
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    fn write(&mut self, owner: &Address, spender: &Address, amount: u128) {
        let prev = self
            .allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
        self.journal.record(AllowanceChange {
            owner: owner.clone(),
            spender: spender.clone(),
            prev,
        });
    }
}
