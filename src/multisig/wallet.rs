//! Multi-signature wallet
//!
//! The public face of the wallet: owns the owner registry, the transaction
//! ledger and the event log, and exposes submit / confirm / revoke / execute.
//! Every operation takes `&mut self`, so calls on one wallet are serialized;
//! hosts that share a wallet across threads wrap it in a lock.

use crate::core::Address;
use crate::multisig::confirmation::ConfirmationManager;
use crate::multisig::dispatch::CallDispatcher;
use crate::multisig::error::{MultisigError, StateError};
use crate::multisig::events::WalletEvent;
use crate::multisig::execution::ExecutionEngine;
use crate::multisig::ledger::{SubmitPolicy, TransactionLedger};
use crate::multisig::registry::OwnerRegistry;
use crate::multisig::transaction::{Transaction, TxId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for a multisig wallet
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletConfig {
    /// Owner addresses, in order
    pub owners: Vec<Address>,
    /// Minimum confirmations required (M in M-of-N)
    pub required: usize,
    /// Whether submitting also confirms
    #[serde(default)]
    pub submit_policy: SubmitPolicy,
    /// Optional human-readable label
    #[serde(default)]
    pub label: Option<String>,
}

impl WalletConfig {
    /// Create a configuration with the default submit policy
    pub fn new(owners: Vec<Address>, required: usize) -> Self {
        Self {
            owners,
            required,
            submit_policy: SubmitPolicy::default(),
            label: None,
        }
    }

    /// Set the submit policy
    pub fn with_submit_policy(mut self, policy: SubmitPolicy) -> Self {
        self.submit_policy = policy;
        self
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A k-of-n multi-signature wallet
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "WalletState", into = "WalletState")]
pub struct MultisigWallet {
    pub(crate) registry: OwnerRegistry,
    pub(crate) ledger: TransactionLedger,
    pub(crate) events: Vec<WalletEvent>,
    /// Transaction whose call is being dispatched right now
    pub(crate) in_flight: Option<TxId>,
    submit_policy: SubmitPolicy,
    label: Option<String>,
    created_at: DateTime<Utc>,
}

/// Serialized form of a wallet
#[derive(Serialize, Deserialize)]
struct WalletState {
    config: WalletConfig,
    transactions: Vec<Transaction>,
    events: Vec<WalletEvent>,
    created_at: DateTime<Utc>,
}

impl From<MultisigWallet> for WalletState {
    fn from(wallet: MultisigWallet) -> Self {
        Self {
            config: wallet.config(),
            transactions: wallet.ledger.as_slice().to_vec(),
            events: wallet.events,
            created_at: wallet.created_at,
        }
    }
}

impl TryFrom<WalletState> for MultisigWallet {
    type Error = StateError;

    /// Stored state goes through the same owner validation as `new`, and
    /// every transaction and event must be one the wallet could have produced
    fn try_from(state: WalletState) -> Result<Self, Self::Error> {
        let registry = OwnerRegistry::new(state.config.owners, state.config.required)?;
        let ledger = TransactionLedger::from_transactions(state.transactions)?;

        for tx in ledger.iter() {
            if !registry.is_owner(&tx.submitted_by) {
                return Err(StateError::UnknownSubmitter {
                    tx_id: tx.id,
                    submitter: tx.submitted_by,
                });
            }
            if let Some(stranger) = tx.confirmations().find(|o| !registry.is_owner(o)) {
                return Err(StateError::StrangerConfirmation {
                    tx_id: tx.id,
                    owner: *stranger,
                });
            }
            // Confirmations are frozen at execution, so quorum must still hold
            if tx.executed && tx.confirmation_count() < registry.threshold() {
                return Err(StateError::ExecutedWithoutQuorum {
                    tx_id: tx.id,
                    have: tx.confirmation_count(),
                    need: registry.threshold(),
                });
            }
        }

        for event in &state.events {
            if event.tx_id() >= ledger.next_id() {
                return Err(StateError::UnknownEventTransaction(event.tx_id()));
            }
            if !registry.is_owner(event.owner()) {
                return Err(StateError::UnknownEventOwner(*event.owner()));
            }
        }

        Ok(Self {
            registry,
            ledger,
            events: state.events,
            in_flight: None,
            submit_policy: state.config.submit_policy,
            label: state.config.label,
            created_at: state.created_at,
        })
    }
}

impl MultisigWallet {
    /// Create a new wallet
    ///
    /// # Errors
    /// `AddressIsNull`, `DuplicateOwner` or `InvalidRequirement`; no wallet is
    /// produced.
    pub fn new(config: WalletConfig) -> Result<Self, MultisigError> {
        let registry = OwnerRegistry::new(config.owners, config.required)?;

        log::info!(
            "Multisig wallet created: {} ({:?})",
            registry.description(),
            config.submit_policy
        );

        Ok(Self {
            registry,
            ledger: TransactionLedger::new(),
            events: Vec::new(),
            in_flight: None,
            submit_policy: config.submit_policy,
            label: config.label,
            created_at: Utc::now(),
        })
    }

    // =========================================================================
    // Mutating operations
    // =========================================================================

    /// Propose a transaction; returns its id
    ///
    /// # Errors
    /// `NotOwner`
    pub fn submit(
        &mut self,
        caller: Address,
        destination: Address,
        value: u128,
        data: Vec<u8>,
    ) -> Result<TxId, MultisigError> {
        let id = self.ledger.submit(
            &self.registry,
            self.submit_policy,
            caller,
            destination,
            value,
            data.clone(),
        )?;

        self.events.push(WalletEvent::SubmitTransaction {
            owner: caller,
            tx_id: id,
            destination,
            value,
            data,
        });
        if self.submit_policy == SubmitPolicy::ConfirmOnSubmit {
            self.events.push(WalletEvent::ConfirmTransaction {
                owner: caller,
                tx_id: id,
            });
        }

        log::info!(
            "Transaction {} submitted by {}: {} to {}",
            id,
            caller.short(),
            value,
            destination
        );
        Ok(id)
    }

    /// Confirm a pending transaction
    ///
    /// # Errors
    /// `NotOwner`, `TransactionNotFound`, `AlreadyExecuted`, `AlreadyConfirmed`
    pub fn confirm(&mut self, caller: Address, id: TxId) -> Result<(), MultisigError> {
        let count =
            ConfirmationManager::new(&self.registry, &mut self.ledger).confirm(caller, id)?;

        self.events.push(WalletEvent::ConfirmTransaction {
            owner: caller,
            tx_id: id,
        });
        log::info!(
            "Transaction {} confirmed by {} ({}/{})",
            id,
            caller.short(),
            count,
            self.registry.threshold()
        );
        Ok(())
    }

    /// Withdraw a confirmation from a pending transaction
    ///
    /// # Errors
    /// `NotOwner`, `TransactionNotFound`, `AlreadyExecuted`, `NotConfirmed`
    pub fn revoke(&mut self, caller: Address, id: TxId) -> Result<(), MultisigError> {
        let count =
            ConfirmationManager::new(&self.registry, &mut self.ledger).revoke(caller, id)?;

        self.events.push(WalletEvent::RevokeConfirmation {
            owner: caller,
            tx_id: id,
        });
        log::info!(
            "Transaction {} revoked by {} ({}/{})",
            id,
            caller.short(),
            count,
            self.registry.threshold()
        );
        Ok(())
    }

    /// Execute a transaction that has reached the threshold
    ///
    /// # Errors
    /// `NotOwner`, `TransactionNotFound`, `AlreadyExecuted`,
    /// `InsufficientConfirmations`, `ExecutionInProgress` when called from
    /// inside another transaction's dispatch, or `CallFailed` after a rollback
    pub fn execute<D: CallDispatcher + ?Sized>(
        &mut self,
        caller: Address,
        id: TxId,
        dispatcher: &mut D,
    ) -> Result<(), MultisigError> {
        ExecutionEngine::execute(self, caller, id, dispatcher)
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    /// Number of owners
    pub fn owner_count(&self) -> usize {
        self.registry.owner_count()
    }

    /// Required confirmations
    pub fn threshold(&self) -> usize {
        self.registry.threshold()
    }

    /// Owners in construction order
    pub fn owners(&self) -> &[Address] {
        self.registry.owners()
    }

    /// Check if an address is an owner
    pub fn is_owner(&self, address: &Address) -> bool {
        self.registry.is_owner(address)
    }

    /// Get a transaction by id
    pub fn transaction(&self, id: TxId) -> Result<&Transaction, MultisigError> {
        self.ledger.get(id)
    }

    /// Number of transactions ever submitted
    pub fn transaction_count(&self) -> usize {
        self.ledger.len()
    }

    /// All transactions in id order
    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.as_slice()
    }

    /// Transactions not yet executed
    pub fn pending_transactions(&self) -> Vec<&Transaction> {
        self.ledger.pending().collect()
    }

    /// Check if `owner` currently confirms transaction `id`
    pub fn is_confirmed_by(&self, id: TxId, owner: &Address) -> Result<bool, MultisigError> {
        Ok(self.ledger.get(id)?.is_confirmed_by(owner))
    }

    /// Check if transaction `id` has reached the threshold and is not executed
    pub fn is_executable(&self, id: TxId) -> Result<bool, MultisigError> {
        let tx = self.ledger.get(id)?;
        Ok(!tx.executed && tx.confirmation_count() >= self.registry.threshold())
    }

    /// Event log, oldest first
    pub fn events(&self) -> &[WalletEvent] {
        &self.events
    }

    /// Submit policy in force
    pub fn submit_policy(&self) -> SubmitPolicy {
        self.submit_policy
    }

    /// Optional label
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        self.registry.description()
    }

    /// Configuration this wallet was built from
    pub fn config(&self) -> WalletConfig {
        WalletConfig {
            owners: self.registry.owners().to_vec(),
            required: self.registry.threshold(),
            submit_policy: self.submit_policy,
            label: self.label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::dispatch::RecordingDispatcher;
    use crate::multisig::transaction::TxStatus;

    fn abc() -> (Address, Address, Address) {
        (
            Address::repeat_byte(0xa1),
            Address::repeat_byte(0xb2),
            Address::repeat_byte(0xc3),
        )
    }

    fn two_of_three() -> MultisigWallet {
        let (a, b, c) = abc();
        MultisigWallet::new(WalletConfig::new(vec![a, b, c], 2)).unwrap()
    }

    #[test]
    fn test_wallet_creation() {
        let (a, b, c) = abc();
        let wallet = two_of_three();

        assert_eq!(wallet.owner_count(), 3);
        assert_eq!(wallet.owners(), &[a, b, c]);
        assert_eq!(wallet.threshold(), 2);
        assert_eq!(wallet.description(), "2-of-3");
        assert_eq!(wallet.transaction_count(), 0);
        assert_eq!(wallet.submit_policy(), SubmitPolicy::ProposeOnly);
    }

    #[test]
    fn test_construction_failures() {
        let (a, b, _) = abc();

        let cases = [
            (WalletConfig::new(vec![Address::ZERO], 1), "Address is null"),
            (WalletConfig::new(vec![a, a, b], 2), "Owner already exists"),
            (WalletConfig::new(vec![], 2), "Invalid requirement"),
            (WalletConfig::new(vec![a, b], 0), "Invalid requirement"),
            (WalletConfig::new(vec![a, b], 3), "Invalid requirement"),
        ];

        for (config, reason) in cases {
            let err = MultisigWallet::new(config).unwrap_err();
            assert_eq!(err.to_string(), reason);
        }

        let wallet = MultisigWallet::new(WalletConfig::new(vec![a, b], 2)).unwrap();
        assert_eq!(wallet.threshold(), wallet.owner_count());
    }

    #[test]
    fn test_two_of_three_scenario() {
        let (a, b, c) = abc();
        let d = Address::repeat_byte(0xdd);
        let mut wallet = two_of_three();
        let mut dispatcher = RecordingDispatcher::new();

        let id = wallet.submit(a, d, 1, vec![]).unwrap();
        assert_eq!(id, 0);

        wallet.confirm(b, id).unwrap();
        assert_eq!(wallet.transaction(id).unwrap().confirmation_count(), 1);
        assert_eq!(
            wallet.execute(a, id, &mut dispatcher),
            Err(MultisigError::InsufficientConfirmations { have: 1, need: 2 })
        );
        assert!(!wallet.is_executable(id).unwrap());

        wallet.confirm(c, id).unwrap();
        assert_eq!(wallet.transaction(id).unwrap().confirmation_count(), 2);
        assert!(wallet.is_executable(id).unwrap());

        wallet.execute(a, id, &mut dispatcher).unwrap();
        assert_eq!(dispatcher.calls().len(), 1);
        assert_eq!(dispatcher.calls()[0].destination, d);
        assert_eq!(dispatcher.calls()[0].value, 1);

        for owner in [a, b, c] {
            assert_eq!(
                wallet.execute(owner, id, &mut dispatcher),
                Err(MultisigError::AlreadyExecuted(id))
            );
        }
        assert_eq!(dispatcher.calls().len(), 1);
        assert_eq!(wallet.transaction(id).unwrap().status(), TxStatus::Executed);
        assert!(wallet.pending_transactions().is_empty());
    }

    #[test]
    fn test_non_owner_rejected_everywhere() {
        let a = Address::repeat_byte(0xa1);
        let z = Address::repeat_byte(0xee);
        let mut wallet = MultisigWallet::new(WalletConfig::new(vec![a], 1)).unwrap();
        let mut dispatcher = RecordingDispatcher::new();

        assert_eq!(
            wallet.submit(z, z, 1, vec![]),
            Err(MultisigError::NotOwner(z))
        );
        assert_eq!(wallet.confirm(z, 0), Err(MultisigError::NotOwner(z)));
        assert_eq!(wallet.revoke(z, 0), Err(MultisigError::NotOwner(z)));
        assert_eq!(
            wallet.execute(z, 0, &mut dispatcher),
            Err(MultisigError::NotOwner(z))
        );

        // Same once a transaction exists
        let id = wallet.submit(a, z, 1, vec![]).unwrap();
        wallet.confirm(a, id).unwrap();
        let before = wallet.transactions().to_vec();
        let events_before = wallet.events().len();

        assert_eq!(wallet.confirm(z, id), Err(MultisigError::NotOwner(z)));
        assert_eq!(wallet.revoke(z, id), Err(MultisigError::NotOwner(z)));
        assert_eq!(
            wallet.execute(z, id, &mut dispatcher),
            Err(MultisigError::NotOwner(z))
        );
        assert_eq!(wallet.transactions(), before.as_slice());
        assert_eq!(wallet.events().len(), events_before);
        assert!(dispatcher.calls().is_empty());
    }

    #[test]
    fn test_revoke_drops_below_threshold() {
        let (a, b, _) = abc();
        let mut wallet = two_of_three();
        let mut dispatcher = RecordingDispatcher::new();

        let id = wallet.submit(a, a, 0, vec![0xab]).unwrap();
        wallet.confirm(a, id).unwrap();
        wallet.confirm(b, id).unwrap();
        wallet.revoke(b, id).unwrap();

        assert!(!wallet.is_confirmed_by(id, &b).unwrap());
        assert!(matches!(
            wallet.execute(a, id, &mut dispatcher),
            Err(MultisigError::InsufficientConfirmations { .. })
        ));

        wallet.confirm(b, id).unwrap();
        wallet.execute(b, id, &mut dispatcher).unwrap();
        assert_eq!(wallet.revoke(a, id), Err(MultisigError::AlreadyExecuted(id)));
        assert_eq!(wallet.confirm(a, id), Err(MultisigError::AlreadyExecuted(id)));
    }

    #[test]
    fn test_confirm_on_submit() {
        let (a, b, c) = abc();
        let config = WalletConfig::new(vec![a, b, c], 2)
            .with_submit_policy(SubmitPolicy::ConfirmOnSubmit);
        let mut wallet = MultisigWallet::new(config).unwrap();

        let id = wallet.submit(a, c, 1, vec![]).unwrap();
        assert!(wallet.is_confirmed_by(id, &a).unwrap());
        assert_eq!(
            wallet.confirm(a, id),
            Err(MultisigError::AlreadyConfirmed(id))
        );

        wallet.confirm(b, id).unwrap();
        assert!(wallet.is_executable(id).unwrap());
        assert_eq!(
            wallet.events()[1],
            WalletEvent::ConfirmTransaction { owner: a, tx_id: id }
        );
    }

    #[test]
    fn test_event_log() {
        let (a, b, c) = abc();
        let mut wallet = two_of_three();
        let mut dispatcher = RecordingDispatcher::new();

        let id = wallet.submit(a, c, 9, vec![1]).unwrap();
        wallet.confirm(a, id).unwrap();
        wallet.confirm(b, id).unwrap();
        wallet.revoke(b, id).unwrap();
        wallet.confirm(c, id).unwrap();
        wallet.execute(b, id, &mut dispatcher).unwrap();

        // Failed calls log nothing
        assert!(wallet.confirm(a, id).is_err());

        let names: Vec<&str> = wallet.events().iter().map(WalletEvent::name).collect();
        assert_eq!(
            names,
            vec![
                "SubmitTransaction",
                "ConfirmTransaction",
                "ConfirmTransaction",
                "RevokeConfirmation",
                "ConfirmTransaction",
                "ExecuteTransaction",
            ]
        );
        assert!(wallet.events().iter().all(|e| e.tx_id() == id));
    }

    #[test]
    fn test_unknown_transaction_lookups() {
        let (a, _, _) = abc();
        let wallet = two_of_three();

        assert_eq!(
            wallet.transaction(3),
            Err(MultisigError::TransactionNotFound(3))
        );
        assert_eq!(
            wallet.is_confirmed_by(3, &a),
            Err(MultisigError::TransactionNotFound(3))
        );
    }

    #[test]
    fn test_state_roundtrip_revalidates() {
        let (a, b, c) = abc();
        let mut wallet = MultisigWallet::new(
            WalletConfig::new(vec![a, b, c], 2).with_label("Treasury"),
        )
        .unwrap();
        let id = wallet.submit(a, c, 1_000, vec![0xde, 0xad]).unwrap();
        wallet.confirm(b, id).unwrap();

        let json = serde_json::to_string(&wallet).unwrap();
        let loaded: MultisigWallet = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.owners(), wallet.owners());
        assert_eq!(loaded.threshold(), 2);
        assert_eq!(loaded.label(), Some("Treasury"));
        assert_eq!(loaded.transactions(), wallet.transactions());
        assert_eq!(loaded.events(), wallet.events());

        // Tampered owner list is rejected on load
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["config"]["required"] = serde_json::json!(4);
        let err = serde_json::from_value::<MultisigWallet>(value).unwrap_err();
        assert!(err.to_string().contains("Invalid requirement"));

        let stranger = serde_json::json!(Address::repeat_byte(0xee));
        let tamper = |edit: &dyn Fn(&mut serde_json::Value)| -> String {
            let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
            edit(&mut value);
            serde_json::from_value::<MultisigWallet>(value)
                .unwrap_err()
                .to_string()
        };

        // Confirmation by a stranger
        let err = tamper(&|v: &mut serde_json::Value| {
            v["transactions"][0]["confirmations"] = serde_json::json!([stranger]);
        });
        assert!(err.contains("confirmed by non-owner"));

        // Proposal by a stranger
        let err = tamper(&|v: &mut serde_json::Value| {
            v["transactions"][0]["submitted_by"] = stranger.clone();
        });
        assert!(err.contains("submitted by non-owner"));

        // Executed with a single confirmation in a 2-of-3 wallet
        let err = tamper(&|v: &mut serde_json::Value| {
            v["transactions"][0]["executed"] = serde_json::json!(true);
        });
        assert!(err.contains("executed with 1 of 2 confirmations"));

        // Event for a transaction that was never submitted
        let err = tamper(&|v: &mut serde_json::Value| {
            v["events"][1]["ConfirmTransaction"]["tx_id"] = serde_json::json!(5);
        });
        assert!(err.contains("unknown transaction 5"));

        // Event by a stranger
        let err = tamper(&|v: &mut serde_json::Value| {
            v["events"][0]["SubmitTransaction"]["owner"] = stranger.clone();
        });
        assert!(err.contains("Event by non-owner"));

        // Executed with quorum is accepted
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["transactions"][0]["executed"] = serde_json::json!(true);
        value["transactions"][0]["confirmations"] =
            serde_json::json!([a.to_string(), b.to_string()]);
        let loaded: MultisigWallet = serde_json::from_value(value).unwrap();
        assert!(loaded.transaction(id).unwrap().executed);
    }
}
