//! Manual Token CLI Application
//!
//! A command-line interface for deploying and operating the token ledger.

use clap::{Parser, Subcommand};
use manual_token::cli::{self, AppState};
use manual_token::contract::BuiltinReceiver;
use manual_token::core::Address;
use manual_token::token::UNLIMITED_ALLOWANCE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "manual-token")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A hand-rolled ERC-20 style token ledger", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".token_data")]
    data_dir: PathBuf,

    /// Identity the command acts as
    #[arg(long, global = true, default_value = "deployer")]
    caller: Address,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a new token, minting the supply to the caller
    Deploy {
        /// Token name
        #[arg(short, long)]
        name: String,

        /// Token symbol
        #[arg(short, long)]
        symbol: String,

        /// Initial supply in whole tokens (scaled by 10^18)
        #[arg(long)]
        supply: u128,

        /// Replace an existing ledger
        #[arg(long)]
        force: bool,
    },

    /// Display token information
    Info,

    /// Show an account balance
    Balance {
        #[arg(short, long)]
        account: Address,
    },

    /// Show an allowance
    Allowance {
        #[arg(short, long)]
        owner: Address,

        #[arg(short, long)]
        spender: Address,
    },

    /// Send tokens from the caller
    Transfer {
        #[arg(short, long)]
        to: Address,

        /// Amount in base units
        #[arg(short, long)]
        amount: u128,
    },

    /// Set the caller's allowance for a spender
    Approve {
        #[arg(short, long)]
        spender: Address,

        /// Amount in base units
        #[arg(short, long, required_unless_present = "unlimited")]
        amount: Option<u128>,

        /// Grant an allowance that is never decremented
        #[arg(long, conflicts_with = "amount")]
        unlimited: bool,
    },

    /// Spend an allowance granted to the caller
    TransferFrom {
        #[arg(short, long)]
        from: Address,

        #[arg(short, long)]
        to: Address,

        /// Amount in base units
        #[arg(short, long)]
        amount: u128,
    },

    /// Destroy tokens held by the caller
    Burn {
        /// Amount in base units
        #[arg(short, long)]
        amount: u128,
    },

    /// Destroy tokens using an allowance granted to the caller
    BurnFrom {
        #[arg(short, long)]
        from: Address,

        /// Amount in base units
        #[arg(short, long)]
        amount: u128,
    },

    /// Approve a receiver and notify it in one operation
    ApproveAndCall {
        #[arg(short, long)]
        spender: Address,

        /// Amount in base units
        #[arg(short, long)]
        amount: u128,

        /// Extra data passed to the receiver (hex)
        #[arg(long)]
        data: Option<String>,
    },

    /// Receiver contract operations
    Receiver {
        #[command(subcommand)]
        action: ReceiverCommands,
    },

    /// Show recent events
    Events {
        /// Number of events to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },
}

#[derive(Subcommand)]
enum ReceiverCommands {
    /// Deploy a built-in receiver (collector, burner, rejecter)
    Deploy {
        #[arg(short, long)]
        kind: BuiltinReceiver,
    },

    /// List deployed receivers
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle deploy separately (doesn't need a loaded ledger)
    if let Commands::Deploy {
        name,
        symbol,
        supply,
        force,
    } = &cli.command
    {
        return cli::cmd_deploy(&cli.data_dir, &cli.caller, name, symbol, *supply, *force);
    }

    let mut state = AppState::load(cli.data_dir.clone())?;
    let caller = cli.caller;

    match cli.command {
        Commands::Deploy { .. } => unreachable!(),

        Commands::Info => cli::cmd_info(&state)?,

        Commands::Balance { account } => cli::cmd_balance(&state, &account)?,

        Commands::Allowance { owner, spender } => {
            cli::cmd_allowance(&state, &owner, &spender)?;
        }

        Commands::Transfer { to, amount } => {
            cli::cmd_transfer(&mut state, &caller, &to, amount)?;
        }

        Commands::Approve {
            spender,
            amount,
            unlimited,
        } => {
            let amount = if unlimited {
                UNLIMITED_ALLOWANCE
            } else {
                amount.ok_or("either --amount or --unlimited is required")?
            };
            cli::cmd_approve(&mut state, &caller, &spender, amount)?;
        }

        Commands::TransferFrom { from, to, amount } => {
            cli::cmd_transfer_from(&mut state, &caller, &from, &to, amount)?;
        }

        Commands::Burn { amount } => cli::cmd_burn(&mut state, &caller, amount)?,

        Commands::BurnFrom { from, amount } => {
            cli::cmd_burn_from(&mut state, &caller, &from, amount)?;
        }

        Commands::ApproveAndCall {
            spender,
            amount,
            data,
        } => {
            cli::cmd_approve_and_call(&mut state, &caller, &spender, amount, data.as_deref())?;
        }

        Commands::Receiver { action } => match action {
            ReceiverCommands::Deploy { kind } => {
                cli::cmd_receiver_deploy(&mut state, &caller, kind)?;
            }
            ReceiverCommands::List => cli::cmd_receiver_list(&state)?,
        },

        Commands::Events { count } => cli::cmd_events(&state, count)?,
    }

    Ok(())
}
