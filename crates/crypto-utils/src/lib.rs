//! # crypto-utils
//!
//! Address codecs and hashing primitives shared by every UTXO chain the
//! wallet speaks: Base58Check, Bech32 (BIP-173), bit-group conversion and
//! hash160 / double SHA-256.
//!
//! Everything here is pure: no I/O, no key material.

pub mod base58;
pub mod bech32;
pub mod error;
pub mod hash;

pub use base58::{base58check_decode, base58check_encode};
pub use bech32::{bech32_decode, bech32_encode, convert_bits, WitnessProgram};
pub use error::CodecError;
pub use hash::{hash160, sha256, sha256d};
