//! Manual Token: a hand-rolled ERC-20 style token ledger in Rust
//!
//! This crate provides:
//! - Per-account balances and a total supply with strict conservation
//! - Allowances, including an unlimited sentinel that is never decremented
//! - Transfer, approve, transfer-from, burn and burn-from operations
//! - `approve_and_call`, which notifies a receiver program synchronously
//!   and lets it reenter the ledger before the approval returns
//! - All-or-nothing execution of every operation via an undo journal
//! - JSON persistence with backups, and a CLI
//!
//! # Example
//!
//! ```rust
//! use manual_token::contract::from_fn;
//! use manual_token::core::Address;
//! use manual_token::runtime::Runtime;
//!
//! let alice = Address::new("alice");
//! let mut runtime = Runtime::deploy(&alice, 1_000_000, "Manual Token", "MT").unwrap();
//!
//! // A receiver that spends half of what it is approved for
//! let spender = runtime
//!     .deploy_receiver(
//!         &alice,
//!         from_fn(|rt, call| {
//!             rt.transfer_from(call.receiver, call.from, call.receiver, call.value / 2)
//!         }),
//!     )
//!     .unwrap();
//!
//! runtime.approve_and_call(&alice, &spender, 100, b"").unwrap();
//! assert_eq!(runtime.balance_of(&spender), 50);
//! assert_eq!(runtime.allowance(&alice, &spender), 50);
//! ```

pub mod cli;
pub mod contract;
pub mod core;
pub mod crypto;
pub mod runtime;
pub mod storage;
pub mod token;

// Re-export commonly used types
pub use crate::contract::{ApprovalCall, ApprovalReceiver, BuiltinReceiver, ContractRegistry};
pub use crate::core::Address;
pub use crate::runtime::Runtime;
pub use crate::storage::{Storage, StorageConfig};
pub use crate::token::{Token, TokenError, TokenEvent, TokenMetadata, UNLIMITED_ALLOWANCE};
