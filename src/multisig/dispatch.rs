//! Outbound call dispatch
//!
//! The wallet never performs calls itself. Once a transaction clears quorum the
//! execution engine hands an [`OutboundCall`] to a [`CallDispatcher`] supplied
//! by the host. The dispatcher receives the wallet too, so a callee is able to
//! call back into it while the outer `execute` is still in progress.

use crate::core::Address;
use crate::multisig::transaction::TxId;
use crate::multisig::wallet::MultisigWallet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an outbound call failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Call reverted: {0}")]
    Reverted(String),
    #[error("Balance overflow")]
    BalanceOverflow,
}

/// The action an executed transaction performs
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundCall {
    pub tx_id: TxId,
    pub destination: Address,
    pub value: u128,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

/// Performs outbound calls on behalf of the wallet
pub trait CallDispatcher {
    /// Perform `call`; an `Err` makes the wallet roll back the execution
    fn dispatch(
        &mut self,
        wallet: &mut MultisigWallet,
        call: &OutboundCall,
    ) -> Result<(), CallError>;
}

impl<F> CallDispatcher for F
where
    F: FnMut(&mut MultisigWallet, &OutboundCall) -> Result<(), CallError>,
{
    fn dispatch(
        &mut self,
        wallet: &mut MultisigWallet,
        call: &OutboundCall,
    ) -> Result<(), CallError> {
        self(wallet, call)
    }
}

/// Dispatcher that accepts every call and keeps a record of it
#[derive(Clone, Debug, Default)]
pub struct RecordingDispatcher {
    calls: Vec<OutboundCall>,
}

impl RecordingDispatcher {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    /// Calls dispatched so far
    pub fn calls(&self) -> &[OutboundCall] {
        &self.calls
    }

    /// Total value sent to `destination`
    pub fn total_sent_to(&self, destination: &Address) -> u128 {
        self.calls
            .iter()
            .filter(|c| &c.destination == destination)
            .map(|c| c.value)
            .sum()
    }
}

impl CallDispatcher for RecordingDispatcher {
    fn dispatch(
        &mut self,
        _wallet: &mut MultisigWallet,
        call: &OutboundCall,
    ) -> Result<(), CallError> {
        log::info!(
            "Dispatching tx {} to {} (value {}, {} bytes of data)",
            call.tx_id,
            call.destination,
            call.value,
            call.data.len()
        );
        self.calls.push(call.clone());
        Ok(())
    }
}

/// Dispatcher backed by a host-side balance
///
/// Each call debits its value; a call worth more than the balance fails with
/// `InsufficientBalance` and leaves the balance unchanged.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FundedDispatcher {
    balance: u128,
    sent: Vec<OutboundCall>,
}

impl FundedDispatcher {
    /// Create a dispatcher holding `balance`
    pub fn with_balance(balance: u128) -> Self {
        Self {
            balance,
            sent: Vec::new(),
        }
    }

    /// Add funds; returns the new balance
    pub fn deposit(&mut self, amount: u128) -> Result<u128, CallError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(CallError::BalanceOverflow)?;
        log::info!("Deposited {} (balance {})", amount, self.balance);
        Ok(self.balance)
    }

    /// Funds still available
    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Calls that went through
    pub fn sent(&self) -> &[OutboundCall] {
        &self.sent
    }
}

impl CallDispatcher for FundedDispatcher {
    fn dispatch(
        &mut self,
        _wallet: &mut MultisigWallet,
        call: &OutboundCall,
    ) -> Result<(), CallError> {
        let remaining = self
            .balance
            .checked_sub(call.value)
            .ok_or(CallError::InsufficientBalance {
                have: self.balance,
                need: call.value,
            })?;

        log::info!(
            "Sending {} to {} for tx {} (balance {} -> {})",
            call.value,
            call.destination,
            call.tx_id,
            self.balance,
            remaining
        );
        self.balance = remaining;
        self.sent.push(call.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::wallet::WalletConfig;

    fn wallet() -> MultisigWallet {
        MultisigWallet::new(WalletConfig::new(vec![Address::repeat_byte(1)], 1)).unwrap()
    }

    fn call(value: u128) -> OutboundCall {
        OutboundCall {
            tx_id: 0,
            destination: Address::repeat_byte(0xdd),
            value,
            data: vec![0xca, 0xfe],
        }
    }

    #[test]
    fn test_recording_dispatcher() {
        let mut wallet = wallet();
        let mut recorder = RecordingDispatcher::new();

        recorder.dispatch(&mut wallet, &call(5)).unwrap();
        recorder.dispatch(&mut wallet, &call(7)).unwrap();

        assert_eq!(recorder.calls().len(), 2);
        assert_eq!(recorder.calls()[0].data, vec![0xca, 0xfe]);
        assert_eq!(recorder.total_sent_to(&Address::repeat_byte(0xdd)), 12);
        assert_eq!(recorder.total_sent_to(&Address::repeat_byte(0xee)), 0);
    }

    #[test]
    fn test_funded_dispatcher() {
        let mut wallet = wallet();
        let mut funded = FundedDispatcher::with_balance(10);

        funded.dispatch(&mut wallet, &call(4)).unwrap();
        assert_eq!(funded.balance(), 6);

        assert_eq!(
            funded.dispatch(&mut wallet, &call(7)),
            Err(CallError::InsufficientBalance { have: 6, need: 7 })
        );
        assert_eq!(funded.balance(), 6);
        assert_eq!(funded.sent().len(), 1);

        assert_eq!(funded.deposit(4), Ok(10));
        assert_eq!(funded.deposit(u128::MAX), Err(CallError::BalanceOverflow));
        assert_eq!(funded.balance(), 10);
    }

    #[test]
    fn test_closure_dispatcher() {
        let mut wallet = wallet();
        let mut seen = 0u128;
        let mut dispatcher =
            |_: &mut MultisigWallet, call: &OutboundCall| -> Result<(), CallError> {
                seen += call.value;
                Err(CallError::Reverted("nope".to_string()))
            };

        let result = dispatcher.dispatch(&mut wallet, &call(3));
        assert_eq!(result, Err(CallError::Reverted("nope".to_string())));
        assert_eq!(seen, 3);
    }
}
