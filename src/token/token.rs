//! ERC-20 style token implementation
//!
//! Composes the account ledger and the allowance store into the public
//! operation set. Every mutating operation is all-or-nothing: it runs
//! between a checkpoint and a commit, and any error unwinds the journals
//! and the event log back to the checkpoint.

use crate::core::Address;
use crate::token::allowance::AllowanceStore;
use crate::token::error::TokenError;
use crate::token::event::{EventLog, TokenEvent};
use crate::token::ledger::AccountLedger;
use serde::{Deserialize, Serialize};

/// Fractional-unit exponent; one whole token is `10^DECIMALS` base units
pub const DECIMALS: u8 = 18;

/// Maximum nesting of operations (reentrant calls included)
pub const MAX_CALL_DEPTH: usize = 1024;

/// Base units per whole token
pub const fn unit() -> u128 {
    10u128.pow(DECIMALS as u32)
}

/// Render a base-unit amount as a decimal string of whole tokens
pub fn format_units(value: u128) -> String {
    let whole = value / unit();
    let frac = value % unit();
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = DECIMALS as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Token metadata (immutable after deployment)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    /// Token name (e.g., "Manual Token")
    pub name: String,
    /// Token symbol (e.g., "MT")
    pub symbol: String,
    /// Decimal places (always `DECIMALS`)
    pub decimals: u8,
    /// Supply minted at deployment, in base units
    pub initial_supply: u128,
    /// Account credited with the initial supply
    pub deployer: Address,
}

impl TokenMetadata {
    /// Create metadata, scaling `whole_units` by `10^DECIMALS`
    pub fn new(
        name: String,
        symbol: String,
        whole_units: u128,
        deployer: Address,
    ) -> Result<Self, TokenError> {
        let initial_supply = whole_units
            .checked_mul(unit())
            .ok_or(TokenError::Overflow)?;

        Ok(Self {
            name,
            symbol,
            decimals: DECIMALS,
            initial_supply,
            deployer,
        })
    }
}

/// Position of every journal at the start of an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    ledger: usize,
    allowances: usize,
    events: usize,
}

/// An ERC-20 style fungible token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Ledger identity, passed to approval receivers
    pub address: Address,
    /// Token metadata
    pub metadata: TokenMetadata,
    ledger: AccountLedger,
    allowances: AllowanceStore,
    events: EventLog,
    /// Operations currently open (greater than 1 while reentered)
    #[serde(skip)]
    depth: usize,
}

impl Token {
    /// Deploy a token, minting `whole_units * 10^18` to `deployer`
    pub fn deploy(
        deployer: &Address,
        whole_units: u128,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let metadata =
            TokenMetadata::new(name.into(), symbol.into(), whole_units, deployer.clone())?;
        let address = Address::derive(&[deployer.as_str(), &metadata.symbol, "0"]);

        let mut token = Self {
            address,
            metadata,
            ledger: AccountLedger::new(),
            allowances: AllowanceStore::new(),
            events: EventLog::new(),
            depth: 0,
        };

        let supply = token.metadata.initial_supply;
        token.atomic(|t| {
            let event = t.ledger.mint(deployer, supply)?;
            t.events.emit(event);
            Ok(())
        })?;

        log::info!(
            "Token deployed: {} ({}) at {}, supply {} to {}",
            token.name(),
            token.symbol(),
            token.address,
            format_units(supply),
            deployer
        );

        Ok(token)
    }

    // =========================================================================
    // ERC-20 View Functions
    // =========================================================================

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get token name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Get token symbol
    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    /// Get decimal places
    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.allowance(owner, spender)
    }

    /// Every event emitted by committed operations, oldest first
    pub fn events(&self) -> &[TokenEvent] {
        self.events.as_slice()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// Get all holders with balances
    pub fn holders(&self) -> Vec<(&Address, u128)> {
        self.ledger.holders()
    }

    /// Get holder count
    pub fn holder_count(&self) -> usize {
        self.ledger.holders().len()
    }

    /// Conservation check: balances sum to the total supply
    pub fn is_conserved(&self) -> bool {
        self.ledger.sum_of_balances() == Some(self.ledger.total_supply())
    }

    // =========================================================================
    // ERC-20 Mutating Functions
    // =========================================================================

    /// Move `amount` from `caller` to `to`
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.atomic(|t| {
            let event = t.ledger.move_balance(caller, to, amount)?;
            t.events.emit(event);
            Ok(())
        })
    }

    /// Set the allowance `caller` grants to `spender` (overwrites)
    pub fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.atomic(|t| {
            let event = t.allowances.set_allowance(caller, spender, amount)?;
            t.events.emit(event);
            Ok(())
        })
    }

    /// Move `amount` from `from` to `to` on `from`'s behalf
    ///
    /// The allowance is consumed before any balance is touched. No
    /// approval event is emitted for the decrement.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.atomic(|t| {
            t.allowances.consume_allowance(from, spender, amount)?;
            let event = t.ledger.move_balance(from, to, amount)?;
            t.events.emit(event);
            Ok(())
        })
    }

    /// Destroy `amount` of the caller's balance
    pub fn burn(&mut self, caller: &Address, amount: u128) -> Result<(), TokenError> {
        self.atomic(|t| {
            let [burn, transfer] = t.ledger.burn_from_account(caller, amount)?;
            t.events.emit(burn);
            t.events.emit(transfer);
            Ok(())
        })
    }

    /// Destroy `amount` of `from`'s balance on `from`'s behalf
    ///
    /// Unlike `transfer_from`, the balance is checked before the
    /// allowance, so an underfunded owner surfaces `InsufficientBalance`
    /// even when the allowance is also short.
    pub fn burn_from(
        &mut self,
        spender: &Address,
        from: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.atomic(|t| {
            t.ledger.ensure_balance(from, amount)?;
            t.allowances.consume_allowance(from, spender, amount)?;
            let [burn, transfer] = t.ledger.burn_from_account(from, amount)?;
            t.events.emit(burn);
            t.events.emit(transfer);
            Ok(())
        })
    }

    // =========================================================================
    // Atomicity
    // =========================================================================

    /// Run `op` as one all-or-nothing operation
    pub fn atomic<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, TokenError>,
    ) -> Result<T, TokenError> {
        let checkpoint = self.begin()?;
        let result = op(self);
        self.end(checkpoint, result)
    }

    /// Open an operation and return the checkpoint to revert to
    pub(crate) fn begin(&mut self) -> Result<Checkpoint, TokenError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(TokenError::CallDepthExceeded(self.depth));
        }
        self.depth += 1;

        Ok(Checkpoint {
            ledger: self.ledger.checkpoint(),
            allowances: self.allowances.checkpoint(),
            events: self.events.len(),
        })
    }

    /// Close the operation opened at `checkpoint`
    ///
    /// On error every write and event since the checkpoint is discarded.
    /// Journals are only cleared when the outermost operation commits,
    /// since an enclosing operation may still fail.
    pub(crate) fn end<T>(
        &mut self,
        checkpoint: Checkpoint,
        result: Result<T, TokenError>,
    ) -> Result<T, TokenError> {
        self.depth = self.depth.saturating_sub(1);

        match &result {
            Ok(_) if self.depth == 0 => {
                self.ledger.commit();
                self.allowances.commit();
            }
            Ok(_) => {}
            Err(e) => {
                log::debug!("Reverting operation at depth {}: {}", self.depth, e);
                self.ledger.revert_to(checkpoint.ledger);
                self.allowances.revert_to(checkpoint.allowances);
                self.events.truncate(checkpoint.events);
            }
        }

        result
    }

    /// Number of operations currently open
    pub fn call_depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::allowance::UNLIMITED_ALLOWANCE;

    fn addr(id: &str) -> Address {
        Address::new(id)
    }

    fn create_test_token() -> Token {
        Token::deploy(&addr("alice"), 1_000_000, "Manual Token", "MT").unwrap()
    }

    #[test]
    fn test_outermost_commit_clears_journals() {
        let mut token = create_test_token();
        let alice = addr("alice");
        let bob = addr("bob");

        token.transfer(&alice, &bob, 5).unwrap();
        token.approve(&alice, &bob, 9).unwrap();
        assert!(token.transfer(&bob, &alice, 6).is_err());

        assert_eq!(token.call_depth(), 0);
        assert_eq!(token.ledger.checkpoint(), 0);
        assert_eq!(token.allowances.checkpoint(), 0);
    }

    #[test]
    fn test_token_deployment() {
        let token = create_test_token();

        assert_eq!(token.name(), "Manual Token");
        assert_eq!(token.symbol(), "MT");
        assert_eq!(token.decimals(), 18);
        assert_eq!(token.total_supply(), 1_000_000 * unit());
        assert_eq!(token.balance_of(&addr("alice")), 1_000_000 * unit());
        assert_eq!(token.holder_count(), 1);
        assert!(token.address().as_str().starts_with("0x"));
        assert_eq!(
            token.events(),
            &[TokenEvent::transfer(
                &Address::zero(),
                &addr("alice"),
                1_000_000 * unit()
            )]
        );
    }

    #[test]
    fn test_deploy_rejects_zero_deployer() {
        let result = Token::deploy(&Address::zero(), 1, "Manual Token", "MT");
        assert!(matches!(result, Err(TokenError::ZeroAddressTarget)));
    }

    #[test]
    fn test_deploy_supply_overflow() {
        let result = Token::deploy(&addr("alice"), u128::MAX, "Manual Token", "MT");
        assert!(matches!(result, Err(TokenError::Overflow)));
    }

    #[test]
    fn test_transfer() {
        let mut token = create_test_token();
        token.transfer(&addr("alice"), &addr("bob"), 1000).unwrap();

        assert_eq!(token.balance_of(&addr("bob")), 1000);
        assert_eq!(token.balance_of(&addr("alice")), 1_000_000 * unit() - 1000);
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::transfer(&addr("alice"), &addr("bob"), 1000))
        );
        assert!(token.is_conserved());
    }

    #[test]
    fn test_transfer_insufficient_balance_leaves_no_trace() {
        let mut token = create_test_token();
        let events_before = token.events().len();

        let result = token.transfer(&addr("bob"), &addr("alice"), 1);
        assert_eq!(result, Err(TokenError::InsufficientBalance));
        assert_eq!(token.events().len(), events_before);
        assert_eq!(token.call_depth(), 0);
    }

    #[test]
    fn test_zero_amount_transfer() {
        let mut token = create_test_token();
        token.transfer(&addr("alice"), &addr("bob"), 0).unwrap();

        assert_eq!(token.balance_of(&addr("bob")), 0);
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::transfer(&addr("alice"), &addr("bob"), 0))
        );
    }

    #[test]
    fn test_self_transfer() {
        let mut token = create_test_token();
        let supply = token.total_supply();
        token.transfer(&addr("alice"), &addr("alice"), 500).unwrap();

        assert_eq!(token.balance_of(&addr("alice")), supply);
        assert_eq!(token.total_supply(), supply);
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::transfer(&addr("alice"), &addr("alice"), 500))
        );
    }

    #[test]
    fn test_approve_overwrites() {
        let mut token = create_test_token();
        token.approve(&addr("alice"), &addr("bob"), 5000).unwrap();
        token.approve(&addr("alice"), &addr("bob"), 3000).unwrap();

        assert_eq!(token.allowance(&addr("alice"), &addr("bob")), 3000);
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::approval(&addr("alice"), &addr("bob"), 3000))
        );
    }

    #[test]
    fn test_transfer_from() {
        let mut token = create_test_token();
        token.approve(&addr("alice"), &addr("bob"), 5000).unwrap();
        let events_before = token.events().len();

        token
            .transfer_from(&addr("bob"), &addr("alice"), &addr("carol"), 1000)
            .unwrap();

        assert_eq!(token.balance_of(&addr("carol")), 1000);
        assert_eq!(token.allowance(&addr("alice"), &addr("bob")), 4000);
        // Only the transfer, no approval event for the decrement
        assert_eq!(
            token.event_log().since(events_before),
            &[TokenEvent::transfer(&addr("alice"), &addr("carol"), 1000)]
        );
    }

    #[test]
    fn test_transfer_from_checks_allowance_first() {
        let mut token = create_test_token();
        token.transfer(&addr("alice"), &addr("dave"), 10).unwrap();
        token.approve(&addr("dave"), &addr("bob"), 5).unwrap();

        // Both checks would fail; allowance is checked first
        let result = token.transfer_from(&addr("bob"), &addr("dave"), &addr("carol"), 20);
        assert_eq!(result, Err(TokenError::InsufficientAllowance));
    }

    #[test]
    fn test_failed_transfer_from_restores_allowance() {
        let mut token = create_test_token();
        token.transfer(&addr("alice"), &addr("dave"), 10).unwrap();
        token.approve(&addr("dave"), &addr("bob"), 100).unwrap();

        // Allowance consumed, then the balance check fails
        let result = token.transfer_from(&addr("bob"), &addr("dave"), &addr("carol"), 20);
        assert_eq!(result, Err(TokenError::InsufficientBalance));
        assert_eq!(token.allowance(&addr("dave"), &addr("bob")), 100);
        assert_eq!(token.balance_of(&addr("dave")), 10);
    }

    #[test]
    fn test_unlimited_allowance_stays_unlimited() {
        let mut token = create_test_token();
        token
            .approve(&addr("alice"), &addr("bob"), UNLIMITED_ALLOWANCE)
            .unwrap();

        for _ in 0..3 {
            token
                .transfer_from(&addr("bob"), &addr("alice"), &addr("carol"), 100)
                .unwrap();
            token.burn_from(&addr("bob"), &addr("alice"), 100).unwrap();
        }

        assert_eq!(
            token.allowance(&addr("alice"), &addr("bob")),
            UNLIMITED_ALLOWANCE
        );
        assert_eq!(token.balance_of(&addr("carol")), 300);
        assert_eq!(token.total_supply(), 1_000_000 * unit() - 300);
        assert!(token.is_conserved());
    }

    #[test]
    fn test_burn() {
        let mut token = create_test_token();
        let supply = token.total_supply();
        let amount = 10 * unit();

        token.burn(&addr("alice"), amount).unwrap();

        assert_eq!(token.total_supply(), supply - amount);
        assert_eq!(token.balance_of(&addr("alice")), supply - amount);
        let n = token.events().len();
        assert_eq!(
            &token.events()[n - 2..],
            &[
                TokenEvent::burn(&addr("alice"), amount),
                TokenEvent::transfer(&addr("alice"), &Address::zero(), amount),
            ]
        );
    }

    #[test]
    fn test_burn_from_checks_balance_first() {
        let mut token = create_test_token();
        token.transfer(&addr("alice"), &addr("dave"), 10).unwrap();
        token.approve(&addr("dave"), &addr("bob"), 100).unwrap();

        let result = token.burn_from(&addr("bob"), &addr("dave"), 20);
        assert_eq!(result, Err(TokenError::InsufficientBalance));
        assert_eq!(token.allowance(&addr("dave"), &addr("bob")), 100);
    }

    #[test]
    fn test_burn_from_consumes_allowance() {
        let mut token = create_test_token();
        token.approve(&addr("alice"), &addr("bob"), 100).unwrap();

        token.burn_from(&addr("bob"), &addr("alice"), 60).unwrap();
        assert_eq!(token.allowance(&addr("alice"), &addr("bob")), 40);

        let result = token.burn_from(&addr("bob"), &addr("alice"), 41);
        assert_eq!(result, Err(TokenError::InsufficientAllowance));
        assert!(token.is_conserved());
    }

    #[test]
    fn test_nested_failure_discards_committed_inner_operation() {
        let mut token = create_test_token();
        let before = token.clone();

        let result: Result<(), TokenError> = token.atomic(|t| {
            t.transfer(&addr("alice"), &addr("bob"), 50)?;
            assert_eq!(t.balance_of(&addr("bob")), 50);
            t.burn(&addr("bob"), 51)
        });

        assert_eq!(result, Err(TokenError::InsufficientBalance));
        assert_eq!(token.balance_of(&addr("bob")), 0);
        assert_eq!(
            token.balance_of(&addr("alice")),
            before.balance_of(&addr("alice"))
        );
        assert_eq!(token.events(), before.events());
    }

    #[test]
    fn test_call_depth_limit() {
        fn recurse(token: &mut Token) -> Result<(), TokenError> {
            token.atomic(recurse)
        }

        let handle = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| {
                let mut token = create_test_token();
                let result = recurse(&mut token);
                assert_eq!(result, Err(TokenError::CallDepthExceeded(MAX_CALL_DEPTH)));
                assert_eq!(token.call_depth(), 0);
            })
            .unwrap();

        handle.join().unwrap();
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(0), "0");
        assert_eq!(format_units(5 * unit()), "5");
        assert_eq!(format_units(unit() + unit() / 2), "1.5");
        assert_eq!(format_units(1), "0.000000000000000001");
    }
}
