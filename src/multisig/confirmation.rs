//! Confirmation bookkeeping
//!
//! Owners confirm or revoke pending transactions. Every check runs before any
//! mutation, so a rejected call leaves the confirmation set untouched.

use crate::core::Address;
use crate::multisig::error::MultisigError;
use crate::multisig::ledger::TransactionLedger;
use crate::multisig::registry::OwnerRegistry;
use crate::multisig::transaction::TxId;

/// Confirms and revokes against a ledger on behalf of owners
pub struct ConfirmationManager<'a> {
    registry: &'a OwnerRegistry,
    ledger: &'a mut TransactionLedger,
}

impl<'a> ConfirmationManager<'a> {
    /// Create a manager over a registry and ledger
    pub fn new(registry: &'a OwnerRegistry, ledger: &'a mut TransactionLedger) -> Self {
        Self { registry, ledger }
    }

    /// Record `caller`'s confirmation of transaction `id`
    ///
    /// # Errors
    /// `NotOwner`, `TransactionNotFound`, `AlreadyExecuted`, `AlreadyConfirmed`
    /// (checked in that order)
    pub fn confirm(&mut self, caller: Address, id: TxId) -> Result<usize, MultisigError> {
        self.registry.ensure_owner(&caller)?;

        let tx = self.ledger.get_mut(id)?;
        if tx.executed {
            return Err(MultisigError::AlreadyExecuted(id));
        }
        if !tx.add_confirmation(caller) {
            return Err(MultisigError::AlreadyConfirmed(id));
        }

        Ok(tx.confirmation_count())
    }

    /// Withdraw `caller`'s confirmation of transaction `id`
    ///
    /// # Errors
    /// `NotOwner`, `TransactionNotFound`, `AlreadyExecuted`, `NotConfirmed`
    /// (checked in that order)
    pub fn revoke(&mut self, caller: Address, id: TxId) -> Result<usize, MultisigError> {
        self.registry.ensure_owner(&caller)?;

        let tx = self.ledger.get_mut(id)?;
        if tx.executed {
            return Err(MultisigError::AlreadyExecuted(id));
        }
        if !tx.remove_confirmation(&caller) {
            return Err(MultisigError::NotConfirmed(id));
        }

        Ok(tx.confirmation_count())
    }
}
