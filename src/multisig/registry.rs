//! Owner registry
//!
//! Holds the immutable owner set and confirmation threshold of a wallet.

use crate::core::Address;
use crate::multisig::error::MultisigError;
use std::collections::HashSet;

/// Owner set plus threshold, validated once at construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerRegistry {
    /// Owners in construction order
    owners: Vec<Address>,
    /// Membership index over `owners`
    index: HashSet<Address>,
    /// Confirmations required to execute (M in M-of-N)
    required: usize,
}

impl OwnerRegistry {
    /// Create a registry from an owner list and threshold
    ///
    /// Checks run over the whole list in this order and stop at the first
    /// failure: null owners, duplicate owners, then the threshold range.
    ///
    /// # Errors
    /// `AddressIsNull`, `DuplicateOwner` or `InvalidRequirement`
    pub fn new(owners: Vec<Address>, required: usize) -> Result<Self, MultisigError> {
        if owners.iter().any(Address::is_zero) {
            return Err(MultisigError::AddressIsNull);
        }

        let mut index = HashSet::with_capacity(owners.len());
        for owner in &owners {
            if !index.insert(*owner) {
                return Err(MultisigError::DuplicateOwner(*owner));
            }
        }

        if owners.is_empty() || required == 0 || required > owners.len() {
            return Err(MultisigError::InvalidRequirement {
                owners: owners.len(),
                required,
            });
        }

        Ok(Self {
            owners,
            index,
            required,
        })
    }

    /// Check if an address is an owner
    pub fn is_owner(&self, address: &Address) -> bool {
        self.index.contains(address)
    }

    /// Fail with `NotOwner` unless `caller` is an owner
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), MultisigError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(MultisigError::NotOwner(*caller))
        }
    }

    /// Number of owners (N)
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Owners in construction order
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// Required confirmations (M)
    pub fn threshold(&self) -> usize {
        self.required
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.required, self.owners.len())
    }
}
