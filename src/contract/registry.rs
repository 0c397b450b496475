//! Receiver contract management
//!
//! Handles receiver deployment and lookup. An address "has code" exactly
//! when it is registered here.

use crate::contract::builtin::BuiltinReceiver;
use crate::contract::receiver::ApprovalReceiver;
use crate::core::{Address, Journal};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Contract errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("Contract already exists: {0}")]
    AlreadyExists(Address),
    #[error("Contract address is the zero address")]
    ZeroAddress,
    #[error("Unknown receiver kind: {0}")]
    UnknownReceiver(String),
}

/// All deployed receivers
#[derive(Clone, Default)]
pub struct ContractRegistry {
    contracts: HashMap<Address, Rc<dyn ApprovalReceiver>>,
    /// Deployment counter for address generation
    nonce: u64,
    /// Addresses installed since the outermost open operation began
    installed: Journal<Address>,
}

/// Registry position to roll back to if an operation fails
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegistryCheckpoint {
    installed: usize,
    nonce: u64,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue address generation from a saved counter
    pub fn with_nonce(nonce: u64) -> Self {
        Self {
            contracts: HashMap::new(),
            nonce,
            installed: Journal::new(),
        }
    }

    /// Deploy a receiver at an address derived from `deployer` and the nonce
    pub fn deploy(
        &mut self,
        deployer: &Address,
        receiver: Rc<dyn ApprovalReceiver>,
    ) -> Result<Address, ContractError> {
        let address = self.generate_address(deployer);
        self.nonce += 1;

        self.register(address.clone(), receiver)?;
        log::info!("Receiver deployed at {}", address);
        Ok(address)
    }

    /// Install a receiver at a known address
    pub fn register(
        &mut self,
        address: Address,
        receiver: Rc<dyn ApprovalReceiver>,
    ) -> Result<(), ContractError> {
        if address.is_zero() {
            return Err(ContractError::ZeroAddress);
        }
        if self.contracts.contains_key(&address) {
            return Err(ContractError::AlreadyExists(address));
        }
        self.installed.record(address.clone());
        self.contracts.insert(address, receiver);
        Ok(())
    }

    /// Get a handle to the receiver at `address`
    pub fn get(&self, address: &Address) -> Option<Rc<dyn ApprovalReceiver>> {
        self.contracts.get(address).cloned()
    }

    /// All receiver addresses, sorted
    pub fn list(&self) -> Vec<Address> {
        let mut addresses: Vec<_> = self.contracts.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    pub fn count(&self) -> usize {
        self.contracts.len()
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Receivers that have a serializable form, sorted by address
    pub fn builtins(&self) -> Vec<(Address, BuiltinReceiver)> {
        let mut builtins: Vec<_> = self
            .contracts
            .iter()
            .filter_map(|(address, receiver)| receiver.builtin().map(|b| (address.clone(), b)))
            .collect();
        builtins.sort_by(|a, b| a.0.cmp(&b.0));
        builtins
    }

    pub(crate) fn checkpoint(&self) -> RegistryCheckpoint {
        RegistryCheckpoint {
            installed: self.installed.len(),
            nonce: self.nonce,
        }
    }

    /// Uninstall every receiver deployed after `checkpoint`
    pub(crate) fn revert_to(&mut self, checkpoint: RegistryCheckpoint) {
        for address in self.installed.unwind(checkpoint.installed) {
            log::debug!("Uninstalling receiver {}", address);
            self.contracts.remove(&address);
        }
        self.nonce = checkpoint.nonce;
    }

    pub(crate) fn commit(&mut self) {
        self.installed.clear();
    }

    fn generate_address(&self, deployer: &Address) -> Address {
        Address::derive(&[deployer.as_str(), &self.nonce.to_string()])
    }
}

impl fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("contracts", &self.list())
            .field("nonce", &self.nonce)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> Rc<dyn ApprovalReceiver> {
        Rc::new(BuiltinReceiver::Collector)
    }

    #[test]
    fn test_receiver_deployment() {
        let mut registry = ContractRegistry::new();
        let deployer = Address::new("deployer");

        let first = registry.deploy(&deployer, collector()).unwrap();
        let second = registry.deploy(&deployer, collector()).unwrap();

        assert!(first.as_str().starts_with("0x"));
        assert_ne!(first, second);
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.nonce(), 2);
        assert!(registry.get(&first).is_some());
        assert!(registry.get(&deployer).is_none());
    }

    #[test]
    fn test_revert_uninstalls_receivers() {
        let mut registry = ContractRegistry::new();
        let deployer = Address::new("deployer");
        let kept = registry.deploy(&deployer, collector()).unwrap();
        registry.commit();

        let checkpoint = registry.checkpoint();
        let dropped = registry.deploy(&deployer, collector()).unwrap();
        registry.register(Address::new("vault"), collector()).unwrap();
        registry.revert_to(checkpoint);

        assert_eq!(registry.list(), vec![kept]);
        assert_eq!(registry.nonce(), 1);
        assert!(registry.get(&dropped).is_none());

        // The freed nonce is handed out again
        assert_eq!(registry.deploy(&deployer, collector()).unwrap(), dropped);
    }

    #[test]
    fn test_register_rejects_duplicates_and_zero() {
        let mut registry = ContractRegistry::new();
        let address = Address::new("vault");

        registry.register(address.clone(), collector()).unwrap();
        assert_eq!(
            registry.register(address.clone(), collector()),
            Err(ContractError::AlreadyExists(address))
        );
        assert_eq!(
            registry.register(Address::zero(), collector()),
            Err(ContractError::ZeroAddress)
        );
    }

    #[test]
    fn test_with_nonce_continues_address_sequence() {
        let deployer = Address::new("deployer");

        let mut fresh = ContractRegistry::new();
        fresh.deploy(&deployer, collector()).unwrap();
        let expected = fresh.deploy(&deployer, collector()).unwrap();

        let mut restored = ContractRegistry::with_nonce(1);
        assert_eq!(restored.deploy(&deployer, collector()).unwrap(), expected);
    }

    #[test]
    fn test_builtins_skip_custom_receivers() {
        let mut registry = ContractRegistry::new();
        let deployer = Address::new("deployer");

        let builtin = registry.deploy(&deployer, collector()).unwrap();
        registry
            .deploy(
                &deployer,
                crate::contract::receiver::from_fn(|_, _| Ok(())),
            )
            .unwrap();

        assert_eq!(
            registry.builtins(),
            vec![(builtin, BuiltinReceiver::Collector)]
        );
    }
}
