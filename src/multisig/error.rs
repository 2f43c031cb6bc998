//! Multisig error conditions
//!
//! The `Display` text of every variant is a fixed reason string that external
//! callers may match on. Context carried in the fields is never part of it.

use crate::core::Address;
use crate::multisig::dispatch::CallError;
use crate::multisig::transaction::TxId;
use thiserror::Error;

/// Errors related to multisig operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    // Construction-time
    #[error("Address is null")]
    AddressIsNull,
    #[error("Owner already exists")]
    DuplicateOwner(Address),
    #[error("Invalid requirement")]
    InvalidRequirement { owners: usize, required: usize },

    // Call-time
    #[error("Not an owner")]
    NotOwner(Address),
    #[error("Transaction does not exist")]
    TransactionNotFound(TxId),
    #[error("Transaction already executed")]
    AlreadyExecuted(TxId),
    #[error("Transaction already confirmed")]
    AlreadyConfirmed(TxId),
    #[error("Transaction not confirmed")]
    NotConfirmed(TxId),
    #[error("Cannot execute transaction")]
    InsufficientConfirmations { have: usize, need: usize },
    #[error("Transaction failed")]
    CallFailed(#[source] CallError),
    #[error("Execution in progress")]
    ExecutionInProgress { running: TxId, requested: TxId },
}

/// Inconsistencies found while rebuilding a wallet from stored state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Invalid owner set: {0}")]
    InvalidOwners(#[from] MultisigError),
    #[error("Transaction at position {position} has id {id}")]
    NonDenseId { position: usize, id: TxId },
    #[error("Transaction {tx_id} submitted by non-owner {submitter}")]
    UnknownSubmitter { tx_id: TxId, submitter: Address },
    #[error("Transaction {tx_id} confirmed by non-owner {owner}")]
    StrangerConfirmation { tx_id: TxId, owner: Address },
    #[error("Transaction {tx_id} executed with {have} of {need} confirmations")]
    ExecutedWithoutQuorum { tx_id: TxId, have: usize, need: usize },
    #[error("Event refers to unknown transaction {0}")]
    UnknownEventTransaction(TxId),
    #[error("Event by non-owner {0}")]
    UnknownEventOwner(Address),
}

impl MultisigError {
    /// The stable reason string reported at the wallet boundary
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Whether this error comes from owner-set validation
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            MultisigError::AddressIsNull
                | MultisigError::DuplicateOwner(_)
                | MultisigError::InvalidRequirement { .. }
        )
    }
}
