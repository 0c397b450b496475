//! Token runtime
//!
//! Owns one token ledger together with the receivers deployed next to it,
//! and exposes the caller-facing operation set. `approve_and_call` lives
//! here because it is the only operation that hands control to receiver
//! code: the receiver gets `&mut Runtime` and may reenter any operation.

use crate::contract::{ApprovalCall, ApprovalReceiver, ContractError, ContractRegistry};
use crate::core::Address;
use crate::token::{Token, TokenError};
use std::rc::Rc;

/// A deployed token and its receiver contracts
#[derive(Debug, Clone)]
pub struct Runtime {
    token: Token,
    contracts: ContractRegistry,
}

impl Runtime {
    /// Deploy a fresh token, minting `whole_units * 10^18` to `deployer`
    pub fn deploy(
        deployer: &Address,
        whole_units: u128,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let token = Token::deploy(deployer, whole_units, name, symbol)?;
        Ok(Self::from_parts(token, ContractRegistry::new()))
    }

    pub fn from_parts(token: Token, mut contracts: ContractRegistry) -> Self {
        contracts.commit();
        Self { token, contracts }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    /// Deploy a receiver program and return its address
    ///
    /// A receiver deployed from inside `approve_and_call` is uninstalled
    /// again if that call fails.
    pub fn deploy_receiver(
        &mut self,
        deployer: &Address,
        receiver: Rc<dyn ApprovalReceiver>,
    ) -> Result<Address, ContractError> {
        let address = self.contracts.deploy(deployer, receiver)?;
        if self.token.call_depth() == 0 {
            self.contracts.commit();
        }
        Ok(address)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.token.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.token.allowance(owner, spender)
    }

    pub fn total_supply(&self) -> u128 {
        self.token.total_supply()
    }

    pub fn name(&self) -> &str {
        self.token.name()
    }

    pub fn symbol(&self) -> &str {
        self.token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.token.transfer(caller, to, amount)
    }

    pub fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.token.approve(caller, spender, amount)
    }

    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.token.transfer_from(caller, from, to, amount)
    }

    pub fn burn(&mut self, caller: &Address, amount: u128) -> Result<(), TokenError> {
        self.token.burn(caller, amount)
    }

    pub fn burn_from(
        &mut self,
        caller: &Address,
        from: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.token.burn_from(caller, from, amount)
    }

    /// Approve `spender` and notify it synchronously
    ///
    /// The allowance is written first and is visible to the receiver,
    /// which may spend it (or call anything else) before this returns.
    /// If the receiver fails, the allowance and everything the receiver
    /// did are rolled back and its error is returned.
    pub fn approve_and_call(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: u128,
        extra_data: &[u8],
    ) -> Result<(), TokenError> {
        if spender.is_zero() {
            return Err(TokenError::ZeroAddressSpender);
        }
        let receiver = self
            .contracts
            .get(spender)
            .ok_or(TokenError::SpenderHasNoCode)?;

        let checkpoint = self.token.begin()?;
        let registry = self.contracts.checkpoint();
        let result =
            self.approve_then_notify(receiver.as_ref(), caller, spender, amount, extra_data);
        if let Err(e) = &result {
            log::warn!(
                "approve_and_call {} -> {} for {} reverted: {}",
                caller,
                spender,
                amount,
                e
            );
            self.contracts.revert_to(registry);
        }

        let result = self.token.end(checkpoint, result);
        if self.token.call_depth() == 0 {
            self.contracts.commit();
        }
        result
    }

    fn approve_then_notify(
        &mut self,
        receiver: &dyn ApprovalReceiver,
        caller: &Address,
        spender: &Address,
        amount: u128,
        extra_data: &[u8],
    ) -> Result<(), TokenError> {
        self.token.approve(caller, spender, amount)?;

        let token = self.token.address().clone();
        log::debug!(
            "Notifying {} of approval from {} for {} (depth {})",
            spender,
            caller,
            amount,
            self.token.call_depth()
        );

        receiver.receive_approval(
            self,
            ApprovalCall {
                receiver: spender,
                from: caller,
                value: amount,
                token: &token,
                extra_data,
            },
        )
    }
}
