use std::time::Duration;

/// Per-request bound after which a provider call is abandoned.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Size assumed for a one-input, one-output P2WPKH spend when turning a fee
/// rate into an absolute fee. An approximation, not a measured size.
pub const ASSUMED_TX_VBYTES: u64 = 250;

/// Absolute fee used when no fee provider answers (0.0001 LTC).
pub const FALLBACK_FEE_SATS: u64 = 10_000;

/// Fee-per-kB assumed when BlockCypher omits `medium_fee_per_kb`.
pub const DEFAULT_FEE_PER_KB: u64 = 10_000;

/// Number of history entries requested from providers.
pub const DEFAULT_TX_HISTORY_LIMIT: usize = 25;

/// Confirmation target, in blocks, read from Esplora fee estimates.
pub const ESPLORA_FEE_TARGET_BLOCKS: u32 = 6;

/// Tunables of the data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDataConfig {
    pub request_timeout: Duration,
    pub assumed_tx_vbytes: u64,
    pub fallback_fee_sats: u64,
    pub tx_history_limit: usize,
}

impl Default for ChainDataConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            assumed_tx_vbytes: ASSUMED_TX_VBYTES,
            fallback_fee_sats: FALLBACK_FEE_SATS,
            tx_history_limit: DEFAULT_TX_HISTORY_LIMIT,
        }
    }
}

impl ChainDataConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_assumed_tx_vbytes(mut self, vbytes: u64) -> Self {
        self.assumed_tx_vbytes = vbytes;
        self
    }

    pub fn with_fallback_fee_sats(mut self, sats: u64) -> Self {
        self.fallback_fee_sats = sats;
        self
    }

    pub fn with_tx_history_limit(mut self, limit: usize) -> Self {
        self.tx_history_limit = limit;
        self
    }
}

/// Where each public indexer serves a given coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinEndpoints {
    /// Ticker stamped on transaction records, e.g. `LTC`.
    pub symbol: String,
    /// e.g. `https://api.blockcypher.com/v1/ltc/main`
    pub blockcypher: String,
    /// e.g. `https://api.blockchair.com/litecoin`
    pub blockchair: String,
    /// SoChain v3 base and network code.
    pub sochain: String,
    pub sochain_network: String,
    /// Esplora-compatible API root, e.g. `https://litecoinspace.org/api`
    pub esplora: String,
    /// chain.so v2 base and network code.
    pub chainso: String,
    pub chainso_network: String,
    pub coingecko: String,
    pub coingecko_id: String,
    pub cryptocompare: String,
    pub coinbase: String,
}

impl CoinEndpoints {
    pub fn litecoin() -> Self {
        Self {
            symbol: "LTC".into(),
            blockcypher: "https://api.blockcypher.com/v1/ltc/main".into(),
            blockchair: "https://api.blockchair.com/litecoin".into(),
            sochain: "https://sochain.com/api/v3".into(),
            sochain_network: "LTC".into(),
            esplora: "https://litecoinspace.org/api".into(),
            chainso: "https://chain.so/api/v2".into(),
            chainso_network: "LTC".into(),
            coingecko: "https://api.coingecko.com/api/v3".into(),
            coingecko_id: "litecoin".into(),
            cryptocompare: "https://min-api.cryptocompare.com/data".into(),
            coinbase: "https://api.coinbase.com/v2".into(),
        }
    }

    pub fn bitcoin() -> Self {
        Self {
            symbol: "BTC".into(),
            blockcypher: "https://api.blockcypher.com/v1/btc/main".into(),
            blockchair: "https://api.blockchair.com/bitcoin".into(),
            sochain: "https://sochain.com/api/v3".into(),
            sochain_network: "BTC".into(),
            esplora: "https://blockstream.info/api".into(),
            chainso: "https://chain.so/api/v2".into(),
            chainso_network: "BTC".into(),
            coingecko: "https://api.coingecko.com/api/v3".into(),
            coingecko_id: "bitcoin".into(),
            cryptocompare: "https://min-api.cryptocompare.com/data".into(),
            coinbase: "https://api.coinbase.com/v2".into(),
        }
    }
}
