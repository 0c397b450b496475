//! Cryptographic utilities
//!
//! Only SHA-256 is needed: it derives token and contract addresses.

pub mod hash;

pub use hash::{sha256, sha256_hex};
