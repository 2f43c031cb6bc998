//! Wallet event log
//!
//! Every successful state change appends one event. Failed calls append
//! nothing.

use crate::core::Address;
use crate::multisig::transaction::TxId;
use serde::{Deserialize, Serialize};

/// Event emitted by a wallet operation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum WalletEvent {
    /// New transaction proposed
    SubmitTransaction {
        owner: Address,
        tx_id: TxId,
        destination: Address,
        value: u128,
        #[serde(with = "hex::serde")]
        data: Vec<u8>,
    },
    /// Owner confirmed a transaction
    ConfirmTransaction { owner: Address, tx_id: TxId },
    /// Owner withdrew a confirmation
    RevokeConfirmation { owner: Address, tx_id: TxId },
    /// Transaction dispatched
    ExecuteTransaction { owner: Address, tx_id: TxId },
}

impl WalletEvent {
    /// Transaction the event refers to
    pub fn tx_id(&self) -> TxId {
        match self {
            WalletEvent::SubmitTransaction { tx_id, .. }
            | WalletEvent::ConfirmTransaction { tx_id, .. }
            | WalletEvent::RevokeConfirmation { tx_id, .. }
            | WalletEvent::ExecuteTransaction { tx_id, .. } => *tx_id,
        }
    }

    /// Owner that caused the event
    pub fn owner(&self) -> &Address {
        match self {
            WalletEvent::SubmitTransaction { owner, .. }
            | WalletEvent::ConfirmTransaction { owner, .. }
            | WalletEvent::RevokeConfirmation { owner, .. }
            | WalletEvent::ExecuteTransaction { owner, .. } => owner,
        }
    }

    /// Short event name
    pub fn name(&self) -> &'static str {
        match self {
            WalletEvent::SubmitTransaction { .. } => "SubmitTransaction",
            WalletEvent::ConfirmTransaction { .. } => "ConfirmTransaction",
            WalletEvent::RevokeConfirmation { .. } => "RevokeConfirmation",
            WalletEvent::ExecuteTransaction { .. } => "ExecuteTransaction",
        }
    }
}
