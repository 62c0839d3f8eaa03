use std::collections::BTreeMap;

use chain_utxo::address::{pubkey_to_address, AddressKind};
use chain_utxo::network::UtxoNetwork;

use crate::error::WalletError;
use crate::hd_derivation;
use crate::types::{Coin, DerivedAddress};

/// Derive the address at `path`, encoded as `kind` for `network`.
pub fn derive_address(
    phrase: &str,
    path: &str,
    kind: AddressKind,
    network: UtxoNetwork,
) -> Result<String, WalletError> {
    let key = hd_derivation::derive_key(phrase, path)?;
    Ok(pubkey_to_address(&key.public_key, kind, network)?)
}

/// Derive a coin's receive address with its fixed path and address kind.
pub fn derive_coin_address(phrase: &str, coin: Coin) -> Result<DerivedAddress, WalletError> {
    let address = derive_address(
        phrase,
        coin.derivation_path(),
        coin.address_kind(),
        coin.network(),
    )?;
    Ok(DerivedAddress {
        coin,
        address,
        derivation_path: coin.derivation_path().to_string(),
    })
}

/// Addresses for every supported coin, keyed by coin id.
pub fn derive_all_addresses(phrase: &str) -> Result<BTreeMap<String, String>, WalletError> {
    let mut addresses = BTreeMap::new();
    for coin in Coin::ALL {
        let derived = derive_coin_address(phrase, coin)?;
        addresses.insert(coin.id().to_string(), derived.address);
    }
    Ok(addresses)
}

/// Validate an address for a given coin
pub fn validate_address(address: &str, coin: Coin) -> bool {
    chain_utxo::address::validate_address(address, coin.network())
}
