//! Account identifiers
//!
//! Addresses are opaque strings. The null identity is the all-zero
//! `0x` address; derived addresses (token and contract deployments) are
//! the first 40 hex digits of a SHA-256 over the deployment inputs.

use crate::crypto::sha256_hex;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The null identity
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// An account identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The null identity
    pub fn zero() -> Self {
        Self(ZERO_ADDRESS.to_string())
    }

    /// Check for the null identity
    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_ADDRESS
    }

    /// Derive a deployment address from arbitrary seed parts
    ///
    /// The parts are joined with `:` before hashing, so
    /// `derive(&["alice", "3"])` hashes `"alice:3"`.
    pub fn derive(parts: &[&str]) -> Self {
        let input = parts.join(":");
        let hex = sha256_hex(input.as_bytes());
        Self(format!("0x{}", &hex[..40]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Address {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl FromStr for Address {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address() {
        assert!(Address::zero().is_zero());
        assert!(Address::new(ZERO_ADDRESS).is_zero());
        assert!(!Address::new("alice").is_zero());
    }

    #[test]
    fn test_derived_address_format() {
        let address = Address::derive(&["deployer", "0"]);
        assert!(address.as_str().starts_with("0x"));
        assert_eq!(address.as_str().len(), 42);
        assert!(!address.is_zero());
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = Address::derive(&["deployer", "0"]);
        let b = Address::derive(&["deployer", "0"]);
        let c = Address::derive(&["deployer", "1"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
