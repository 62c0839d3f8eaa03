//! UTXO chain support for the wallet.
//!
//! Provides address encoding for Litecoin and Bitcoin style networks, greedy
//! UTXO selection, and construction of native SegWit (P2WPKH) transactions
//! signed with the BIP-143 signature hash.

pub mod address;
pub mod der;
pub mod error;
pub mod network;
pub mod sighash;
pub mod transaction;
pub mod utxo;
