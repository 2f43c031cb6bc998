//! Core primitives shared across the wallet
//!
//! - Addresses (20-byte account identifiers, null = all zeros)

pub mod address;

pub use address::{Address, AddressError, ADDRESS_LEN};
