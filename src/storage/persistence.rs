//! Wallet persistence layer
//!
//! Provides save/load functionality for the wallet, the host treasury and
//! wallet configuration files.
//!
//! The wallet and the treasury that pays its calls are written together into
//! one state file, so an execute and its payout are persisted atomically.

use crate::multisig::{FundedDispatcher, MultisigWallet, WalletConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub wallet_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".multisig_data"),
            wallet_file: "wallet.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// On-disk layout of the state file
#[derive(Serialize)]
struct StoredState<'a> {
    wallet: &'a MultisigWallet,
    treasury: &'a FundedDispatcher,
}

#[derive(Deserialize)]
struct LoadedState {
    wallet: MultisigWallet,
    #[serde(default)]
    treasury: FundedDispatcher,
}

/// Treasury part of the state file, read without decoding the wallet
#[derive(Deserialize)]
struct TreasuryOnly {
    #[serde(default)]
    treasury: FundedDispatcher,
}

/// Wallet storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    /// Get the wallet file path
    fn wallet_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.wallet_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.wallet_file, index))
    }

    /// Save the wallet and its treasury to disk in a single write
    pub fn save(
        &self,
        wallet: &MultisigWallet,
        treasury: &FundedDispatcher,
    ) -> Result<(), StorageError> {
        let path = self.wallet_path();

        // Create backup if enabled
        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        write_atomic(
            &self.config.data_dir,
            &path,
            &StoredState { wallet, treasury },
        )?;
        log::debug!(
            "Saved wallet with {} transactions and treasury balance {} to {:?}",
            wallet.transaction_count(),
            treasury.balance(),
            path
        );

        Ok(())
    }

    /// Load the wallet and its treasury from disk
    ///
    /// The owner set is validated again while decoding.
    pub fn load(&self) -> Result<(MultisigWallet, FundedDispatcher), StorageError> {
        let path = self.wallet_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Wallet file not found".to_string(),
            ));
        }

        let state: LoadedState = read_json(&path)?;
        log::debug!(
            "Loaded {} wallet with {} transactions",
            state.wallet.description(),
            state.wallet.transaction_count()
        );

        Ok((state.wallet, state.treasury))
    }

    /// Check if a saved wallet exists
    pub fn exists(&self) -> bool {
        self.wallet_path().exists()
    }

    /// Delete the saved wallet
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.wallet_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Load only the treasury, empty if nothing was saved yet
    ///
    /// The wallet part is skipped, so this works on a file whose wallet no
    /// longer validates.
    pub fn load_treasury(&self) -> Result<FundedDispatcher, StorageError> {
        let path = self.wallet_path();
        if !path.exists() {
            return Ok(FundedDispatcher::default());
        }
        let stored: TreasuryOnly = read_json(&path)?;
        Ok(stored.treasury)
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&current, &next)?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(
        &self,
        backup_index: usize,
    ) -> Result<(MultisigWallet, FundedDispatcher), StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        let state: LoadedState = read_json(&backup_path)?;
        Ok((state.wallet, state.treasury))
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(i).exists())
            .collect()
    }
}

/// Write JSON to a temporary file, then rename it over `path`
///
/// The rename only happens once the data is flushed and synced, so `path`
/// holds either the old contents or the complete new ones.
fn write_atomic<T: Serialize>(dir: &Path, path: &Path, value: &T) -> Result<(), StorageError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StorageError::InvalidData(format!("Bad file path {:?}", path)))?;
    let temp_path = dir.join(format!("{}.tmp", file_name));

    write_json(&temp_path, value)?;

    // Atomic rename
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Load a wallet configuration file
///
/// ```json
/// { "owners": ["0x…", "0x…"], "required": 2, "submit_policy": "propose_only" }
/// ```
pub fn load_config(path: &Path) -> Result<WalletConfig, StorageError> {
    let config: WalletConfig = read_json(path)?;
    log::debug!(
        "Loaded config from {:?}: {} owners, {} required",
        path,
        config.owners.len(),
        config.required
    );
    Ok(config)
}

/// Save wallet to a specific file path
pub fn save_to_file(wallet: &MultisigWallet, path: &Path) -> Result<(), StorageError> {
    write_json(path, wallet)
}

/// Load wallet from a specific file path
pub fn load_from_file(path: &Path) -> Result<MultisigWallet, StorageError> {
    read_json(path)
}
