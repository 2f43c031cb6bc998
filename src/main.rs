//! Multisig Wallet CLI Application
//!
//! A command-line host for a k-of-n multi-signature wallet.

use clap::{Parser, Subcommand};
use multisig_wallet::cli::{self, AppState, InitOptions};
use multisig_wallet::core::Address;
use multisig_wallet::multisig::TxId;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A k-of-n multi-signature wallet in Rust", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet
    Init {
        /// Owner address (repeat for each owner)
        #[arg(short, long = "owner")]
        owners: Vec<Address>,

        /// Confirmations required to execute
        #[arg(short, long)]
        required: Option<usize>,

        /// Read owners and threshold from a JSON config file instead
        #[arg(short, long, conflicts_with_all = ["owners", "required"])]
        config: Option<PathBuf>,

        /// Record the submitter's confirmation when submitting
        #[arg(long)]
        confirm_on_submit: bool,

        /// Optional label for the wallet
        #[arg(short, long)]
        label: Option<String>,

        /// Replace an existing wallet
        #[arg(long)]
        force: bool,
    },

    /// Add funds to the treasury that pays executed transactions
    Deposit {
        /// Amount to deposit
        #[arg(short, long)]
        amount: u128,
    },

    /// Propose a transaction
    Submit {
        /// Owner submitting the transaction
        #[arg(short, long)]
        caller: Address,

        /// Destination address
        #[arg(short, long)]
        to: Address,

        /// Value to send
        #[arg(short, long, default_value = "0")]
        value: u128,

        /// Call payload as hex
        #[arg(long, default_value = "")]
        data: String,
    },

    /// Confirm a transaction
    Confirm {
        /// Confirming owner
        #[arg(short, long)]
        caller: Address,

        /// Transaction id
        #[arg(short, long)]
        id: TxId,
    },

    /// Revoke a confirmation
    Revoke {
        /// Revoking owner
        #[arg(short, long)]
        caller: Address,

        /// Transaction id
        #[arg(short, long)]
        id: TxId,
    },

    /// Execute a confirmed transaction
    Execute {
        /// Executing owner
        #[arg(short, long)]
        caller: Address,

        /// Transaction id
        #[arg(short, long)]
        id: TxId,
    },

    /// Show the wallet or a single transaction
    Show {
        /// Transaction id
        #[arg(short, long)]
        id: Option<TxId>,
    },

    /// List owners
    Owners,

    /// Show recent events
    Events {
        /// Number of events to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need existing state)
    if let Commands::Init {
        owners,
        required,
        config,
        confirm_on_submit,
        label,
        force,
    } = cli.command
    {
        let options = InitOptions {
            owners,
            required,
            config_file: config,
            confirm_on_submit,
            label,
            force,
        };
        return cli::cmd_init(&cli.data_dir, options);
    }

    // Load application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    // Process commands
    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Deposit { amount } => {
            cli::cmd_deposit(&mut state, amount)?;
        }

        Commands::Submit {
            caller,
            to,
            value,
            data,
        } => {
            cli::cmd_submit(&mut state, caller, to, value, &data)?;
        }

        Commands::Confirm { caller, id } => {
            cli::cmd_confirm(&mut state, caller, id)?;
        }

        Commands::Revoke { caller, id } => {
            cli::cmd_revoke(&mut state, caller, id)?;
        }

        Commands::Execute { caller, id } => {
            cli::cmd_execute(&mut state, caller, id)?;
        }

        Commands::Show { id } => {
            cli::cmd_show(&state, id)?;
        }

        Commands::Owners => {
            cli::cmd_owners(&state)?;
        }

        Commands::Events { count } => {
            cli::cmd_events(&state, count)?;
        }
    }

    Ok(())
}
