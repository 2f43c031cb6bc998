//! Proposed wallet transactions
//!
//! A transaction is an outgoing action (destination, value, payload) waiting
//! for owner confirmations.

use crate::core::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sequential transaction identifier, starting at 0
pub type TxId = u64;

/// Lifecycle state of a transaction
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxStatus {
    /// Collecting confirmations
    Pending,
    /// Dispatched; terminal
    Executed,
}

/// A proposed outgoing action
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Position in the ledger
    pub id: TxId,
    /// Target of the outbound call
    pub destination: Address,
    /// Amount transferred with the call
    pub value: u128,
    /// Opaque call payload
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
    /// Set once, never cleared
    pub executed: bool,
    /// Owners that currently confirm this transaction
    confirmations: BTreeSet<Address>,
    /// Owner that proposed it
    pub submitted_by: Address,
    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,
    /// Execution timestamp
    pub executed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new pending transaction with no confirmations
    pub fn new(
        id: TxId,
        destination: Address,
        value: u128,
        data: Vec<u8>,
        submitted_by: Address,
    ) -> Self {
        Self {
            id,
            destination,
            value,
            data,
            executed: false,
            confirmations: BTreeSet::new(),
            submitted_by,
            submitted_at: Utc::now(),
            executed_at: None,
        }
    }

    /// Current status
    pub fn status(&self) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else {
            TxStatus::Pending
        }
    }

    /// Number of confirmations collected
    pub fn confirmation_count(&self) -> usize {
        self.confirmations.len()
    }

    /// Check if `owner` has confirmed
    pub fn is_confirmed_by(&self, owner: &Address) -> bool {
        self.confirmations.contains(owner)
    }

    /// Owners that have confirmed, in address order
    pub fn confirmations(&self) -> impl Iterator<Item = &Address> {
        self.confirmations.iter()
    }

    /// Record a confirmation; returns false if already present
    pub(crate) fn add_confirmation(&mut self, owner: Address) -> bool {
        self.confirmations.insert(owner)
    }

    /// Drop a confirmation; returns false if it was not present
    pub(crate) fn remove_confirmation(&mut self, owner: &Address) -> bool {
        self.confirmations.remove(owner)
    }

    /// Mark as executed
    pub(crate) fn mark_executed(&mut self) {
        self.executed = true;
        self.executed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction::new(
            0,
            Address::repeat_byte(0xdd),
            1,
            vec![],
            Address::repeat_byte(0xa1),
        )
    }

    #[test]
    fn test_new_transaction_is_pending() {
        let tx = sample_tx();

        assert_eq!(tx.id, 0);
        assert!(!tx.executed);
        assert_eq!(tx.status(), TxStatus::Pending);
        assert_eq!(tx.confirmation_count(), 0);
        assert!(tx.executed_at.is_none());
    }

    #[test]
    fn test_confirmation_set() {
        let mut tx = sample_tx();
        let a = Address::repeat_byte(0xa1);
        let b = Address::repeat_byte(0xb2);

        assert!(tx.add_confirmation(b));
        assert!(tx.add_confirmation(a));
        assert!(!tx.add_confirmation(a));
        assert_eq!(tx.confirmation_count(), 2);
        assert!(tx.is_confirmed_by(&a));
        assert_eq!(tx.confirmations().copied().collect::<Vec<_>>(), vec![a, b]);

        assert!(tx.remove_confirmation(&a));
        assert!(!tx.remove_confirmation(&a));
        assert_eq!(tx.confirmation_count(), 1);
        assert!(!tx.is_confirmed_by(&a));
    }

    #[test]
    fn test_mark_executed() {
        let mut tx = sample_tx();
        tx.mark_executed();

        assert!(tx.executed);
        assert_eq!(tx.status(), TxStatus::Executed);
        assert!(tx.executed_at.is_some());
    }

    #[test]
    fn test_payload_serialized_as_hex() {
        let mut tx = sample_tx();
        tx.data = vec![0xde, 0xad, 0xbe, 0xef];

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["data"], "deadbeef");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
