//! Ledger notifications

use crate::core::Address;
use serde::{Deserialize, Serialize};

/// A notification produced by a successful state change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEvent {
    /// Value moved; `from` is zero on mint, `to` is zero on burn
    Transfer {
        from: Address,
        to: Address,
        value: u128,
    },
    /// Allowance set (overwritten) by `owner` for `spender`
    Approval {
        owner: Address,
        spender: Address,
        value: u128,
    },
    /// Supply destroyed from `from`, always followed by a `Transfer` to zero
    Burn { from: Address, value: u128 },
}

impl TokenEvent {
    pub fn transfer(from: &Address, to: &Address, value: u128) -> Self {
        TokenEvent::Transfer {
            from: from.clone(),
            to: to.clone(),
            value,
        }
    }

    pub fn approval(owner: &Address, spender: &Address, value: u128) -> Self {
        TokenEvent::Approval {
            owner: owner.clone(),
            spender: spender.clone(),
            value,
        }
    }

    pub fn burn(from: &Address, value: u128) -> Self {
        TokenEvent::Burn {
            from: from.clone(),
            value,
        }
    }
}

/// Append-only event log, ordered by operation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog(Vec<TokenEvent>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: TokenEvent) {
        log::debug!("event: {:?}", event);
        self.0.push(event);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All events, oldest first
    pub fn as_slice(&self) -> &[TokenEvent] {
        &self.0
    }

    /// Events recorded at or after position `from`
    pub fn since(&self, from: usize) -> &[TokenEvent] {
        &self.0[from.min(self.0.len())..]
    }

    /// Drop events recorded by a failed operation
    pub(crate) fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}
