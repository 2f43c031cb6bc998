//! Threshold-gated execution
//!
//! Execution is check, commit, then call:
//!
//! 1. the caller must be an owner, the transaction must exist, must not be
//!    executed yet and must have at least `threshold` confirmations;
//! 2. `executed` is set before anything leaves the wallet, so a re-entrant
//!    `execute` of the same id fails with `AlreadyExecuted`;
//! 3. the call is dispatched. If it fails, the wallet is restored to the
//!    state it had before step 2, including whatever re-entrant calls did in
//!    the meantime, and `CallFailed` is returned. The transaction stays
//!    pending and may be executed again.
//!
//! While a call is in flight the wallet refuses to execute any other
//! transaction. A rollback could otherwise undo the flag of a nested execute
//! whose payout already happened, and that transaction would pay out twice.

use crate::core::Address;
use crate::multisig::dispatch::{CallDispatcher, OutboundCall};
use crate::multisig::error::MultisigError;
use crate::multisig::events::WalletEvent;
use crate::multisig::ledger::TransactionLedger;
use crate::multisig::registry::OwnerRegistry;
use crate::multisig::transaction::TxId;
use crate::multisig::wallet::MultisigWallet;

/// Wallet state captured before a call leaves the wallet
struct Checkpoint {
    ledger: TransactionLedger,
    event_count: usize,
}

impl Checkpoint {
    fn take(wallet: &MultisigWallet) -> Self {
        Self {
            ledger: wallet.ledger.clone(),
            event_count: wallet.events.len(),
        }
    }

    fn restore(self, wallet: &mut MultisigWallet) {
        wallet.ledger = self.ledger;
        wallet.events.truncate(self.event_count);
    }
}

/// Evaluates quorum and dispatches approved transactions
pub struct ExecutionEngine;

impl ExecutionEngine {
    /// Validate that `caller` may execute `id` right now
    ///
    /// Returns the call that execution would dispatch.
    ///
    /// # Errors
    /// `NotOwner`, `TransactionNotFound`, `AlreadyExecuted`,
    /// `InsufficientConfirmations` (checked in that order)
    pub fn prepare(
        registry: &OwnerRegistry,
        ledger: &TransactionLedger,
        caller: &Address,
        id: TxId,
    ) -> Result<OutboundCall, MultisigError> {
        registry.ensure_owner(caller)?;

        let tx = ledger.get(id)?;
        if tx.executed {
            return Err(MultisigError::AlreadyExecuted(id));
        }

        let have = tx.confirmation_count();
        let need = registry.threshold();
        if have < need {
            return Err(MultisigError::InsufficientConfirmations { have, need });
        }

        Ok(OutboundCall {
            tx_id: id,
            destination: tx.destination,
            value: tx.value,
            data: tx.data.clone(),
        })
    }

    /// Execute transaction `id` through `dispatcher`
    ///
    /// # Errors
    /// Those of [`prepare`](Self::prepare), `ExecutionInProgress` when another
    /// transaction's call is still in flight, or `CallFailed`
    pub fn execute<D: CallDispatcher + ?Sized>(
        wallet: &mut MultisigWallet,
        caller: Address,
        id: TxId,
        dispatcher: &mut D,
    ) -> Result<(), MultisigError> {
        let call = Self::prepare(&wallet.registry, &wallet.ledger, &caller, id)?;
        if let Some(running) = wallet.in_flight {
            return Err(MultisigError::ExecutionInProgress {
                running,
                requested: id,
            });
        }

        let checkpoint = Checkpoint::take(wallet);
        wallet.ledger.get_mut(id)?.mark_executed();

        wallet.in_flight = Some(id);
        let outcome = dispatcher.dispatch(wallet, &call);
        wallet.in_flight = None;

        if let Err(e) = outcome {
            checkpoint.restore(wallet);
            log::warn!("Execution of tx {} rolled back: {}", id, e);
            return Err(MultisigError::CallFailed(e));
        }

        wallet.events.push(WalletEvent::ExecuteTransaction {
            owner: caller,
            tx_id: id,
        });
        log::info!(
            "Transaction {} executed by {} ({} to {})",
            id,
            caller.short(),
            call.value,
            call.destination
        );

        Ok(())
    }
}
