//! CLI commands for the multisig wallet
//!
//! Implements all command handlers for the CLI interface. The CLI acts as the
//! host: it trusts the `--caller` it is given and pays executed transactions
//! out of a locally stored treasury.

use crate::core::Address;
use crate::multisig::{
    FundedDispatcher, MultisigWallet, SubmitPolicy, Transaction, TxId, WalletConfig,
};
use crate::storage::{load_config, Storage, StorageConfig};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub wallet: MultisigWallet,
    pub treasury: FundedDispatcher,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from an initialized data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;

        if !storage.exists() {
            return Err(format!(
                "No wallet found in {:?}. Create one with: multisig init",
                data_dir
            )
            .into());
        }

        let (wallet, treasury) = storage.load()?;

        Ok(Self {
            wallet,
            treasury,
            storage,
            data_dir,
        })
    }

    /// Save the wallet and treasury together
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.wallet, &self.treasury)?;
        Ok(())
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

/// Parse a hex payload, with or without `0x`
pub fn parse_data(data: &str) -> CliResult<Vec<u8>> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    Ok(hex::decode(digits)?)
}

/// Options for `init`
pub struct InitOptions {
    pub owners: Vec<Address>,
    pub required: Option<usize>,
    pub config_file: Option<PathBuf>,
    pub confirm_on_submit: bool,
    pub label: Option<String>,
    pub force: bool,
}

impl InitOptions {
    /// Build the wallet configuration from a file or from flags
    fn wallet_config(&self) -> CliResult<WalletConfig> {
        let mut config = match &self.config_file {
            Some(path) => load_config(path)?,
            None => {
                let required = self
                    .required
                    .ok_or("--required is needed when no --config file is given")?;
                WalletConfig::new(self.owners.clone(), required)
            }
        };

        if self.confirm_on_submit {
            config.submit_policy = SubmitPolicy::ConfirmOnSubmit;
        }
        if let Some(label) = &self.label {
            config.label = Some(label.clone());
        }

        Ok(config)
    }
}

/// Create a new wallet
pub fn cmd_init(data_dir: &Path, options: InitOptions) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() && !options.force {
        println!("⚠️  Wallet already exists at {:?}", data_dir);
        println!("   Use --force to reinitialize (the treasury balance is kept)");
        return Ok(());
    }

    let wallet = MultisigWallet::new(options.wallet_config()?)?;

    // Funds belong to the host, so a reinitialized wallet keeps them
    let treasury = storage.load_treasury()?;
    storage.save(&wallet, &treasury)?;

    println!("✅ Wallet initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🔐 Policy: {}", wallet.description());
    for (i, owner) in wallet.owners().iter().enumerate() {
        println!("   👤 Owner {}: {}", i, owner);
    }
    if treasury.balance() > 0 {
        println!(
            "   💰 Kept existing treasury balance: {}",
            treasury.balance()
        );
    }

    Ok(())
}

/// Fund the treasury
pub fn cmd_deposit(state: &mut AppState, amount: u128) -> CliResult<()> {
    let balance = state.treasury.deposit(amount)?;
    state.save()?;

    println!("💰 Deposited {}. Treasury balance: {}", amount, balance);
    Ok(())
}

/// Propose a transaction
pub fn cmd_submit(
    state: &mut AppState,
    caller: Address,
    to: Address,
    value: u128,
    data: &str,
) -> CliResult<()> {
    let data = parse_data(data)?;
    let id = state.wallet.submit(caller, to, value, data)?;
    state.save()?;

    println!("📝 Transaction {} submitted", id);
    print_transaction(state.wallet.transaction(id)?, state.wallet.threshold());
    Ok(())
}

/// Confirm a transaction
pub fn cmd_confirm(state: &mut AppState, caller: Address, id: TxId) -> CliResult<()> {
    state.wallet.confirm(caller, id)?;
    state.save()?;

    let tx = state.wallet.transaction(id)?;
    println!(
        "✅ Confirmed transaction {} ({}/{})",
        id,
        tx.confirmation_count(),
        state.wallet.threshold()
    );
    if state.wallet.is_executable(id)? {
        println!("   Ready to execute: multisig execute --caller <owner> --id {}", id);
    }
    Ok(())
}

/// Revoke a confirmation
pub fn cmd_revoke(state: &mut AppState, caller: Address, id: TxId) -> CliResult<()> {
    state.wallet.revoke(caller, id)?;
    state.save()?;

    let tx = state.wallet.transaction(id)?;
    println!(
        "↩️  Revoked confirmation of transaction {} ({}/{})",
        id,
        tx.confirmation_count(),
        state.wallet.threshold()
    );
    Ok(())
}

/// Execute a transaction
pub fn cmd_execute(state: &mut AppState, caller: Address, id: TxId) -> CliResult<()> {
    state.wallet.execute(caller, id, &mut state.treasury)?;
    state.save()?;

    let tx = state.wallet.transaction(id)?;
    println!("🚀 Transaction {} executed", id);
    println!("   ├─ To: {}", tx.destination);
    println!("   ├─ Value: {}", tx.value);
    println!("   └─ Treasury balance: {}", state.treasury.balance());
    Ok(())
}

/// Show one transaction or all of them
pub fn cmd_show(state: &AppState, id: Option<TxId>) -> CliResult<()> {
    let threshold = state.wallet.threshold();

    if let Some(id) = id {
        print_transaction(state.wallet.transaction(id)?, threshold);
        return Ok(());
    }

    let label = state.wallet.label().unwrap_or("-");
    println!("🔐 Wallet {} ({})", state.wallet.description(), label);
    println!("   Treasury balance: {}", state.treasury.balance());
    println!("   Transactions: {}", state.wallet.transaction_count());

    if state.wallet.transaction_count() == 0 {
        println!("\n📭 No transactions yet. Propose one with: multisig submit");
        return Ok(());
    }

    println!();
    for tx in state.wallet.transactions() {
        print_transaction(tx, threshold);
    }
    Ok(())
}

/// List owners
pub fn cmd_owners(state: &AppState) -> CliResult<()> {
    println!(
        "👥 Owners ({} required of {}):",
        state.wallet.threshold(),
        state.wallet.owner_count()
    );
    for owner in state.wallet.owners() {
        println!("   {}", owner);
    }
    Ok(())
}

/// Show the most recent events
pub fn cmd_events(state: &AppState, count: usize) -> CliResult<()> {
    let events = state.wallet.events();
    let start = events.len().saturating_sub(count);

    println!("📜 Events ({} of {}):", events.len() - start, events.len());
    for (i, event) in events.iter().enumerate().skip(start) {
        println!("   #{} {} tx {}", i, event.name(), event.tx_id());
    }
    Ok(())
}

fn print_transaction(tx: &Transaction, threshold: usize) {
    println!("   Transaction {} [{:?}]", tx.id, tx.status());
    println!("   ├─ To: {}", tx.destination);
    println!("   ├─ Value: {}", tx.value);
    println!("   ├─ Data: 0x{}", hex::encode(&tx.data));
    println!("   ├─ Submitted by: {} at {}", tx.submitted_by, tx.submitted_at);
    println!(
        "   └─ Confirmations: {}/{}",
        tx.confirmation_count(),
        threshold
    );
    for owner in tx.confirmations() {
        println!("      └─ {}", owner);
    }
}
