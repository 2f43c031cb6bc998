//! Append-only transaction ledger
//!
//! Transactions live in a dense arena indexed by id. Ids are allocated
//! sequentially from 0 and never reused; nothing is ever removed.

use crate::core::Address;
use crate::multisig::error::{MultisigError, StateError};
use crate::multisig::registry::OwnerRegistry;
use crate::multisig::transaction::{Transaction, TxId};
use serde::{Deserialize, Serialize};

/// Whether the submitter's confirmation is recorded at submission
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    /// Submitting does not confirm; the proposer confirms separately
    #[default]
    ProposeOnly,
    /// The submitter confirms in the same step
    ConfirmOnSubmit,
}

/// Store of every transaction ever proposed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// Rebuild a ledger from stored transactions
    ///
    /// Ids must be dense and match their position.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Result<Self, StateError> {
        for (position, tx) in transactions.iter().enumerate() {
            if tx.id != position as TxId {
                return Err(StateError::NonDenseId {
                    position,
                    id: tx.id,
                });
            }
        }
        Ok(Self { transactions })
    }

    /// Propose a new transaction
    ///
    /// # Errors
    /// `NotOwner` if `caller` is not a registered owner; nothing is allocated.
    pub fn submit(
        &mut self,
        registry: &OwnerRegistry,
        policy: SubmitPolicy,
        caller: Address,
        destination: Address,
        value: u128,
        data: Vec<u8>,
    ) -> Result<TxId, MultisigError> {
        registry.ensure_owner(&caller)?;

        let id = self.next_id();
        let mut tx = Transaction::new(id, destination, value, data, caller);
        if policy == SubmitPolicy::ConfirmOnSubmit {
            tx.add_confirmation(caller);
        }
        self.transactions.push(tx);

        Ok(id)
    }

    /// Get a transaction by id
    pub fn get(&self, id: TxId) -> Result<&Transaction, MultisigError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.transactions.get(index))
            .ok_or(MultisigError::TransactionNotFound(id))
    }

    /// Get a mutable reference to a transaction
    pub(crate) fn get_mut(&mut self, id: TxId) -> Result<&mut Transaction, MultisigError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.transactions.get_mut(index))
            .ok_or(MultisigError::TransactionNotFound(id))
    }

    /// Id the next submission will receive
    pub fn next_id(&self) -> TxId {
        self.transactions.len() as TxId
    }

    /// Number of transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if no transaction was ever submitted
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// All transactions in id order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Transactions still collecting confirmations
    pub fn pending(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| !tx.executed)
    }

    /// Stored transactions as a slice
    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }
}
