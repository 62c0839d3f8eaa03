//! Wallet configuration.
//!
//! Values come from defaults, optionally overlaid by a JSON file and then by
//! `LTC_WALLET_*` environment variables. Every approximation the engine
//! relies on (dust threshold, assumed transaction size, fallback fee) is a
//! field here rather than a literal at its use site.
//!
//! Example `wallet-config.json`:
//! ```json
//! {
//!   "primary_coin": "ltc",
//!   "sync_interval_secs": 30,
//!   "request_timeout_secs": 8,
//!   "store_path": "/var/lib/ltc-wallet/wallet.json"
//! }
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chain_data::config::{
    ASSUMED_TX_VBYTES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TX_HISTORY_LIMIT, FALLBACK_FEE_SATS,
};
use chain_data::ChainDataConfig;
use chain_utxo::transaction::{TxPolicy, DUST_THRESHOLD_SATS};
use serde::Deserialize;

use crate::error::WalletError;
use crate::types::Coin;

/// Period of the background refresh while a session is active.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Delay between confirmation polls after a broadcast.
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Polls before `wait_for_confirmation` gives up (10 minutes at the default interval).
pub const DEFAULT_CONFIRMATION_MAX_POLLS: u32 = 60;

pub const DEFAULT_STORE_FILE: &str = "wallet.json";

/// Prefix of every environment variable read by [`WalletConfig::from_env`].
pub const ENV_PREFIX: &str = "LTC_WALLET_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    pub primary_coin: Coin,
    pub sync_interval: Duration,
    pub request_timeout: Duration,
    pub dust_threshold_sats: u64,
    pub assumed_tx_vbytes: u64,
    pub fallback_fee_sats: u64,
    pub tx_history_limit: usize,
    pub confirmation_poll_interval: Duration,
    pub confirmation_max_polls: u32,
    pub store_path: PathBuf,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            primary_coin: Coin::Litecoin,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            dust_threshold_sats: DUST_THRESHOLD_SATS,
            assumed_tx_vbytes: ASSUMED_TX_VBYTES,
            fallback_fee_sats: FALLBACK_FEE_SATS,
            tx_history_limit: DEFAULT_TX_HISTORY_LIMIT,
            confirmation_poll_interval: DEFAULT_CONFIRMATION_POLL_INTERVAL,
            confirmation_max_polls: DEFAULT_CONFIRMATION_MAX_POLLS,
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

/// On-disk shape; every field optional so a file only names what it changes.
#[derive(Debug, Default, Deserialize)]
struct WalletConfigFile {
    primary_coin: Option<Coin>,
    sync_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    dust_threshold_sats: Option<u64>,
    assumed_tx_vbytes: Option<u64>,
    fallback_fee_sats: Option<u64>,
    tx_history_limit: Option<usize>,
    confirmation_poll_interval_secs: Option<u64>,
    confirmation_max_polls: Option<u32>,
    store_path: Option<PathBuf>,
}

impl WalletConfig {
    /// Defaults overlaid with `LTC_WALLET_*` variables from the process environment.
    pub fn from_env() -> Result<Self, WalletError> {
        Self::default().overlay_env(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("{}: {e}", path.display())))?;
        Self::default().overlay_json(&contents)
    }

    /// Apply the fields present in a JSON document.
    pub fn overlay_json(mut self, json: &str) -> Result<Self, WalletError> {
        let file: WalletConfigFile =
            serde_json::from_str(json).map_err(|e| WalletError::Config(e.to_string()))?;

        if let Some(coin) = file.primary_coin {
            self.primary_coin = coin;
        }
        if let Some(secs) = file.sync_interval_secs {
            self.sync_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(sats) = file.dust_threshold_sats {
            self.dust_threshold_sats = sats;
        }
        if let Some(vbytes) = file.assumed_tx_vbytes {
            self.assumed_tx_vbytes = vbytes;
        }
        if let Some(sats) = file.fallback_fee_sats {
            self.fallback_fee_sats = sats;
        }
        if let Some(limit) = file.tx_history_limit {
            self.tx_history_limit = limit;
        }
        if let Some(secs) = file.confirmation_poll_interval_secs {
            self.confirmation_poll_interval = Duration::from_secs(secs);
        }
        if let Some(polls) = file.confirmation_max_polls {
            self.confirmation_max_polls = polls;
        }
        if let Some(path) = file.store_path {
            self.store_path = path;
        }
        self.validated()
    }

    /// Apply `LTC_WALLET_*` variables resolved through `lookup`.
    pub fn overlay_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WalletError> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(coin) = var("COIN") {
            self.primary_coin = Coin::from_id(&coin)?;
        }
        if let Some(secs) = parse_var::<u64>(&var, "SYNC_INTERVAL_SECS")? {
            self.sync_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&var, "REQUEST_TIMEOUT_SECS")? {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(sats) = parse_var::<u64>(&var, "DUST_THRESHOLD_SATS")? {
            self.dust_threshold_sats = sats;
        }
        if let Some(vbytes) = parse_var::<u64>(&var, "ASSUMED_TX_VBYTES")? {
            self.assumed_tx_vbytes = vbytes;
        }
        if let Some(sats) = parse_var::<u64>(&var, "FALLBACK_FEE_SATS")? {
            self.fallback_fee_sats = sats;
        }
        if let Some(limit) = parse_var::<usize>(&var, "TX_HISTORY_LIMIT")? {
            self.tx_history_limit = limit;
        }
        if let Some(secs) = parse_var::<u64>(&var, "CONFIRMATION_POLL_SECS")? {
            self.confirmation_poll_interval = Duration::from_secs(secs);
        }
        if let Some(polls) = parse_var::<u32>(&var, "CONFIRMATION_MAX_POLLS")? {
            self.confirmation_max_polls = polls;
        }
        if let Some(path) = var("STORE_PATH") {
            self.store_path = PathBuf::from(path);
        }
        self.validated()
    }

    fn validated(self) -> Result<Self, WalletError> {
        if self.sync_interval.is_zero() {
            return Err(WalletError::Config("sync interval must be non-zero".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(WalletError::Config("request timeout must be non-zero".into()));
        }
        if self.tx_history_limit == 0 {
            return Err(WalletError::Config("tx history limit must be non-zero".into()));
        }
        Ok(self)
    }

    pub fn with_primary_coin(mut self, coin: Coin) -> Self {
        self.primary_coin = coin;
        self
    }

    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_dust_threshold_sats(mut self, sats: u64) -> Self {
        self.dust_threshold_sats = sats;
        self
    }

    pub fn with_fallback_fee_sats(mut self, sats: u64) -> Self {
        self.fallback_fee_sats = sats;
        self
    }

    pub fn with_confirmation_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.confirmation_poll_interval = interval;
        self.confirmation_max_polls = max_polls;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// The subset handed to the chain data layer.
    pub fn chain_data_config(&self) -> ChainDataConfig {
        ChainDataConfig::default()
            .with_request_timeout(self.request_timeout)
            .with_assumed_tx_vbytes(self.assumed_tx_vbytes)
            .with_fallback_fee_sats(self.fallback_fee_sats)
            .with_tx_history_limit(self.tx_history_limit)
    }

    pub fn tx_policy(&self) -> TxPolicy {
        TxPolicy {
            dust_threshold_sats: self.dust_threshold_sats,
        }
    }
}

fn parse_var<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, WalletError>
where
    T::Err: std::fmt::Display,
{
    match var(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| WalletError::Config(format!("{ENV_PREFIX}{name}={raw:?}: {e}"))),
    }
}
