//! Litecoin-first wallet engine.
//!
//! A [`WalletSession`] owns one identity (seed phrase plus derived
//! addresses), keeps it in a JSON [`WalletStore`], refreshes price, balance
//! and history through a [`SyncOrchestrator`], and builds, signs and
//! broadcasts payments.

pub mod address;
pub mod config;
pub mod error;
pub mod hd_derivation;
pub mod logging;
pub mod mnemonic;
pub mod session;
pub mod store;
pub mod sync;
pub mod types;

pub use config::WalletConfig;
pub use error::WalletError;
pub use logging::init_logging;
pub use mnemonic::WordCount;
pub use session::{SendReceipt, WalletSession};
pub use store::WalletStore;
pub use sync::{SyncHandle, SyncOrchestrator, SyncPhase, SyncState, WalletSnapshot};
pub use types::{Coin, DerivedAddress, WalletIdentity};

// ─── Stateless helpers ───────────────────────────────────────────────

/// Whether `phrase` is a valid 12 or 24 word English mnemonic.
pub fn is_valid_mnemonic(phrase: &str) -> bool {
    mnemonic::validate_mnemonic(phrase)
}

/// Whether `word` is in the BIP-39 English word list.
pub fn is_valid_bip39_word(word: &str) -> bool {
    mnemonic::is_valid_word(word)
}

/// Receive address for `coin` from a mnemonic.
pub fn derive_address_from_mnemonic(phrase: &str, coin: Coin) -> Result<DerivedAddress, WalletError> {
    let phrase = mnemonic::normalize_phrase(phrase);
    mnemonic::parse_mnemonic(&phrase)?;
    address::derive_coin_address(&phrase, coin)
}

/// Whether `address` can receive `coin`.
pub fn validate_address(address: &str, coin: Coin) -> bool {
    address::validate_address(address, coin)
}
