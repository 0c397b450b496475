//! ERC-20 style fungible token ledger
//!
//! Provides:
//! - Balances per address and an aggregate total supply
//! - Allowances for delegated transfers, with an unlimited sentinel
//! - Transfer, approve, transfer-from, burn and burn-from operations
//! - All-or-nothing execution backed by an undo journal
//!
//! # Example
//!
//! ```rust
//! use manual_token::core::Address;
//! use manual_token::token::{unit, Token};
//!
//! let alice = Address::new("alice");
//! let bob = Address::new("bob");
//!
//! let mut token = Token::deploy(&alice, 1_000_000, "Manual Token", "MT").unwrap();
//! token.transfer(&alice, &bob, 5 * unit()).unwrap();
//!
//! assert_eq!(token.balance_of(&bob), 5 * unit());
//! ```

pub mod allowance;
pub mod error;
pub mod event;
pub mod ledger;
pub mod token;

pub use allowance::{AllowanceStore, UNLIMITED_ALLOWANCE};
pub use error::TokenError;
pub use event::{EventLog, TokenEvent};
pub use ledger::AccountLedger;
pub use token::{format_units, unit, Token, TokenMetadata, DECIMALS, MAX_CALL_DEPTH};
