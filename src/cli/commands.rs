//! CLI commands for the token ledger
//!
//! Implements all command handlers for the CLI interface. Every mutating
//! command loads the saved ledger, applies one operation and saves it
//! back only if the operation succeeded.

use crate::contract::BuiltinReceiver;
use crate::core::Address;
use crate::runtime::Runtime;
use crate::storage::{Storage, StorageConfig};
use crate::token::{format_units, TokenEvent, UNLIMITED_ALLOWANCE};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub runtime: Runtime,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load the deployed ledger from `data_dir`
    pub fn load(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;

        if !storage.exists() {
            return Err(format!(
                "no ledger found in {:?}; run `manual-token deploy` first",
                data_dir
            )
            .into());
        }

        let runtime = storage.load()?;
        Ok(Self {
            runtime,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.runtime)?;
        Ok(())
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(config)?)
}

fn describe(amount: u128) -> String {
    if amount == UNLIMITED_ALLOWANCE {
        "unlimited".to_string()
    } else {
        format!("{} ({} base units)", format_units(amount), amount)
    }
}

/// Deploy a new token, minting `supply` whole units to `deployer`
pub fn cmd_deploy(
    data_dir: &Path,
    deployer: &Address,
    name: &str,
    symbol: &str,
    supply: u128,
    force: bool,
) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() && !force {
        println!("⚠️  A ledger already exists at {:?}", data_dir);
        println!("   Use --force to redeploy (this will replace existing data)");
        return Ok(());
    }

    let runtime = Runtime::deploy(deployer, supply, name, symbol)?;
    storage.save(&runtime)?;

    println!("✅ Token deployed!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🏷️  {} ({})", runtime.name(), runtime.symbol());
    println!("   📍 Address: {}", runtime.token().address());
    println!("   💰 Supply: {}", describe(runtime.total_supply()));
    println!("   👤 Minted to: {}", deployer);

    Ok(())
}

/// Show token information
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let token = state.runtime.token();

    println!("🪙 {} ({})", token.name(), token.symbol());
    println!("   ├─ Address: {}", token.address());
    println!("   ├─ Decimals: {}", token.decimals());
    println!("   ├─ Total supply: {}", describe(token.total_supply()));
    println!("   ├─ Holders: {}", token.holder_count());
    println!("   ├─ Receivers: {}", state.runtime.contracts().count());
    println!("   └─ Events: {}", token.events().len());

    Ok(())
}

pub fn cmd_balance(state: &AppState, account: &Address) -> CliResult<()> {
    let balance = state.runtime.balance_of(account);
    println!("💰 Balance for {}", account);
    println!("   {}", describe(balance));
    Ok(())
}

pub fn cmd_allowance(state: &AppState, owner: &Address, spender: &Address) -> CliResult<()> {
    let allowance = state.runtime.allowance(owner, spender);
    println!("🔓 Allowance {} -> {}", owner, spender);
    println!("   {}", describe(allowance));
    Ok(())
}

pub fn cmd_transfer(
    state: &mut AppState,
    caller: &Address,
    to: &Address,
    amount: u128,
) -> CliResult<()> {
    state.runtime.transfer(caller, to, amount)?;
    state.save()?;

    println!("✅ Transferred {} from {} to {}", describe(amount), caller, to);
    Ok(())
}

pub fn cmd_approve(
    state: &mut AppState,
    caller: &Address,
    spender: &Address,
    amount: u128,
) -> CliResult<()> {
    state.runtime.approve(caller, spender, amount)?;
    state.save()?;

    println!("✅ {} may now spend {} of {}'s tokens", spender, describe(amount), caller);
    Ok(())
}

pub fn cmd_transfer_from(
    state: &mut AppState,
    caller: &Address,
    from: &Address,
    to: &Address,
    amount: u128,
) -> CliResult<()> {
    state.runtime.transfer_from(caller, from, to, amount)?;
    state.save()?;

    println!(
        "✅ {} moved {} from {} to {}",
        caller,
        describe(amount),
        from,
        to
    );
    println!(
        "   Remaining allowance: {}",
        describe(state.runtime.allowance(from, caller))
    );
    Ok(())
}

pub fn cmd_burn(state: &mut AppState, caller: &Address, amount: u128) -> CliResult<()> {
    state.runtime.burn(caller, amount)?;
    state.save()?;

    println!("🔥 Burned {} from {}", describe(amount), caller);
    println!("   Total supply: {}", describe(state.runtime.total_supply()));
    Ok(())
}

pub fn cmd_burn_from(
    state: &mut AppState,
    caller: &Address,
    from: &Address,
    amount: u128,
) -> CliResult<()> {
    state.runtime.burn_from(caller, from, amount)?;
    state.save()?;

    println!("🔥 {} burned {} from {}", caller, describe(amount), from);
    println!("   Total supply: {}", describe(state.runtime.total_supply()));
    Ok(())
}

/// Approve a receiver and notify it in the same operation
pub fn cmd_approve_and_call(
    state: &mut AppState,
    caller: &Address,
    spender: &Address,
    amount: u128,
    data_hex: Option<&str>,
) -> CliResult<()> {
    let extra_data = match data_hex {
        Some(h) => hex::decode(h.trim_start_matches("0x"))?,
        None => Vec::new(),
    };

    let before = state.runtime.token().events().len();
    state
        .runtime
        .approve_and_call(caller, spender, amount, &extra_data)?;
    state.save()?;

    println!("✅ Approved and notified {}", spender);
    for event in state.runtime.token().event_log().since(before) {
        println!("   └─ {}", render_event(event));
    }
    Ok(())
}

/// Deploy a built-in receiver program
pub fn cmd_receiver_deploy(
    state: &mut AppState,
    deployer: &Address,
    kind: BuiltinReceiver,
) -> CliResult<()> {
    let address = state.runtime.deploy_receiver(deployer, Rc::new(kind))?;
    state.save()?;

    println!("📜 {} receiver deployed", kind);
    println!("   📍 Address: {}", address);
    Ok(())
}

pub fn cmd_receiver_list(state: &AppState) -> CliResult<()> {
    let receivers = state.runtime.contracts().builtins();

    if receivers.is_empty() {
        println!("📭 No receivers deployed. Deploy one with: manual-token receiver deploy");
        return Ok(());
    }

    println!("📋 Receivers:");
    for (address, kind) in receivers {
        println!(
            "   {} ({}) - {}",
            address,
            kind,
            describe(state.runtime.balance_of(&address))
        );
    }
    Ok(())
}

/// Show the most recent events
pub fn cmd_events(state: &AppState, count: usize) -> CliResult<()> {
    let events = state.runtime.token().events();
    let start = events.len().saturating_sub(count);

    println!("📜 Events ({} of {}):", events.len() - start, events.len());
    for (i, event) in events.iter().enumerate().skip(start) {
        println!("   #{} {}", i, render_event(event));
    }
    Ok(())
}

fn render_event(event: &TokenEvent) -> String {
    match event {
        TokenEvent::Transfer { from, to, value } => {
            format!("Transfer {} -> {}: {}", from, to, describe(*value))
        }
        TokenEvent::Approval {
            owner,
            spender,
            value,
        } => format!("Approval {} -> {}: {}", owner, spender, describe(*value)),
        TokenEvent::Burn { from, value } => format!("Burn {}: {}", from, describe(*value)),
    }
}
