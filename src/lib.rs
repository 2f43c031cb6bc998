//! Multisig Wallet: a k-of-n multi-signature authorization wallet in Rust
//!
//! This crate provides:
//! - A fixed owner set with a confirmation threshold
//! - An append-only transaction ledger with per-owner confirmations
//! - Exactly-once execution through a pluggable call dispatcher
//! - An observable event log for every state change
//! - JSON persistence with backups
//!
//! # Example
//!
//! ```rust
//! use multisig_wallet::{Address, MultisigWallet, RecordingDispatcher, WalletConfig};
//!
//! let owners = vec![Address::repeat_byte(1), Address::repeat_byte(2)];
//! let mut wallet = MultisigWallet::new(WalletConfig::new(owners.clone(), 2)).unwrap();
//!
//! let id = wallet.submit(owners[0], Address::repeat_byte(9), 5, vec![]).unwrap();
//! wallet.confirm(owners[0], id).unwrap();
//! wallet.confirm(owners[1], id).unwrap();
//!
//! let mut dispatcher = RecordingDispatcher::new();
//! wallet.execute(owners[1], id, &mut dispatcher).unwrap();
//! assert_eq!(dispatcher.total_sent_to(&Address::repeat_byte(9)), 5);
//! ```

pub mod cli;
pub mod core;
pub mod multisig;
pub mod storage;

// Re-export commonly used types
pub use crate::core::Address;
pub use crate::multisig::{
    CallDispatcher, CallError, FundedDispatcher, MultisigError, MultisigWallet, OutboundCall,
    RecordingDispatcher, StateError, SubmitPolicy, Transaction, TxId, WalletConfig, WalletEvent,
};
pub use crate::storage::{Storage, StorageConfig, StorageError};
