//! Core ledger building blocks
//!
//! - Addresses (account identifiers and the null identity)
//! - The undo journal behind all-or-nothing operations

pub mod address;
pub mod journal;

pub use address::{Address, ZERO_ADDRESS};
pub use journal::Journal;
