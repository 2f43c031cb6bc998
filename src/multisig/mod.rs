//! Multi-signature wallet and transaction support
//!
//! Provides k-of-n wallets where a quorum of owners must confirm an outgoing
//! action before it executes.
//!
//! # Example
//!
//! ```rust
//! use multisig_wallet::core::Address;
//! use multisig_wallet::multisig::{MultisigWallet, RecordingDispatcher, WalletConfig};
//!
//! let (a, b, c) = (
//!     Address::repeat_byte(0xa1),
//!     Address::repeat_byte(0xb2),
//!     Address::repeat_byte(0xc3),
//! );
//!
//! // Create a 2-of-3 wallet
//! let mut wallet = MultisigWallet::new(WalletConfig::new(vec![a, b, c], 2)).unwrap();
//!
//! // Propose a transaction
//! let id = wallet.submit(a, Address::repeat_byte(0xdd), 1, vec![]).unwrap();
//!
//! // Collect confirmations
//! wallet.confirm(b, id).unwrap();
//! wallet.confirm(c, id).unwrap();
//!
//! // Any owner may now execute it, exactly once
//! let mut dispatcher = RecordingDispatcher::new();
//! wallet.execute(a, id, &mut dispatcher).unwrap();
//! assert!(wallet.execute(b, id, &mut dispatcher).is_err());
//! ```

pub mod confirmation;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod execution;
pub mod ledger;
pub mod registry;
pub mod transaction;
pub mod wallet;

pub use confirmation::ConfirmationManager;
pub use dispatch::{CallDispatcher, CallError, FundedDispatcher, OutboundCall, RecordingDispatcher};
pub use error::{MultisigError, StateError};
pub use events::WalletEvent;
pub use execution::ExecutionEngine;
pub use ledger::{SubmitPolicy, TransactionLedger};
pub use registry::OwnerRegistry;
pub use transaction::{Transaction, TxId, TxStatus};
pub use wallet::{MultisigWallet, WalletConfig};
