//! Receiver contracts
//!
//! `approve_and_call` only accepts spenders that are deployed programs.
//! This module provides:
//! - The `ApprovalReceiver` capability those programs implement
//! - A registry that deploys them and answers "does this address have code"
//! - Built-in, serializable receivers (collector, burner, rejecter)
//!
//! # Example
//!
//! ```rust
//! use manual_token::contract::BuiltinReceiver;
//! use manual_token::core::Address;
//! use manual_token::runtime::Runtime;
//! use std::rc::Rc;
//!
//! let alice = Address::new("alice");
//! let mut runtime = Runtime::deploy(&alice, 1_000, "Manual Token", "MT").unwrap();
//!
//! let vault = runtime
//!     .deploy_receiver(&alice, Rc::new(BuiltinReceiver::Collector))
//!     .unwrap();
//! runtime.approve_and_call(&alice, &vault, 100, b"").unwrap();
//!
//! assert_eq!(runtime.balance_of(&vault), 100);
//! ```

pub mod builtin;
pub mod receiver;
pub mod registry;

pub use builtin::BuiltinReceiver;
pub use receiver::{from_fn, ApprovalCall, ApprovalReceiver};
pub use registry::{ContractError, ContractRegistry};
