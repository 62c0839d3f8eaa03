use std::collections::BTreeMap;
use std::fmt;

use chain_data::CoinEndpoints;
use chain_utxo::address::AddressKind;
use chain_utxo::network::UtxoNetwork;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Supported coins. Each one fixes a derivation path, an address scheme and
/// the indexer endpoints used for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Coin {
    #[serde(rename = "ltc")]
    Litecoin,
    #[serde(rename = "btc")]
    Bitcoin,
}

impl Coin {
    pub const ALL: [Coin; 2] = [Coin::Litecoin, Coin::Bitcoin];

    /// Key used in the persisted address map.
    pub fn id(self) -> &'static str {
        match self {
            Coin::Litecoin => "ltc",
            Coin::Bitcoin => "btc",
        }
    }

    pub fn from_id(id: &str) -> Result<Self, WalletError> {
        match id.trim().to_ascii_lowercase().as_str() {
            "ltc" | "litecoin" => Ok(Coin::Litecoin),
            "btc" | "bitcoin" => Ok(Coin::Bitcoin),
            other => Err(WalletError::UnsupportedCoin(other.to_string())),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Coin::Litecoin => "Litecoin",
            Coin::Bitcoin => "Bitcoin",
        }
    }

    pub fn symbol(self) -> &'static str {
        self.network().symbol()
    }

    pub fn network(self) -> UtxoNetwork {
        match self {
            Coin::Litecoin => UtxoNetwork::LitecoinMainnet,
            Coin::Bitcoin => UtxoNetwork::BitcoinMainnet,
        }
    }

    /// BIP-84 receive path, first account, first address.
    ///
    /// - LTC: m/84'/2'/0'/0/0
    /// - BTC: m/84'/0'/0'/0/0
    pub fn derivation_path(self) -> &'static str {
        match self {
            Coin::Litecoin => "m/84'/2'/0'/0/0",
            Coin::Bitcoin => "m/84'/0'/0'/0/0",
        }
    }

    pub fn address_kind(self) -> AddressKind {
        AddressKind::P2wpkh
    }

    pub fn endpoints(self) -> CoinEndpoints {
        match self {
            Coin::Litecoin => CoinEndpoints::litecoin(),
            Coin::Bitcoin => CoinEndpoints::bitcoin(),
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Derived address for a specific coin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub coin: Coin,
    pub address: String,
    pub derivation_path: String,
}

/// The one secret a session holds, plus the addresses derived from it.
///
/// Immutable once created; replacing it means logging out and importing again.
#[derive(Clone)]
pub struct WalletIdentity {
    seed_phrase: Zeroizing<String>,
    /// Coin id (`ltc`, `btc`) to address.
    addresses: BTreeMap<String, String>,
    /// Milliseconds since the Unix epoch.
    created_at: i64,
}

impl WalletIdentity {
    pub fn new(seed_phrase: String, addresses: BTreeMap<String, String>, created_at: i64) -> Self {
        Self {
            seed_phrase: Zeroizing::new(seed_phrase),
            addresses,
            created_at,
        }
    }

    pub fn seed_phrase(&self) -> &str {
        &self.seed_phrase
    }

    pub fn addresses(&self) -> &BTreeMap<String, String> {
        &self.addresses
    }

    pub fn address(&self, coin: Coin) -> Result<&str, WalletError> {
        self.addresses
            .get(coin.id())
            .map(String::as_str)
            .ok_or_else(|| WalletError::UnsupportedCoin(format!("no {coin} address derived")))
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("seed_phrase", &"<redacted>")
            .field("addresses", &self.addresses)
            .field("created_at", &self.created_at)
            .finish()
    }
}
