use serde::{Deserialize, Serialize};

use crate::amount::{format_sats, parse_coin_amount};

/// Provider name used on sentinel results when every provider failed.
pub const NO_SOURCE: &str = "none";

/// A value tagged with the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: String,
}

/// Balance as an 8-decimal coin string. Empty when no provider answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub balance: String,
    pub source: String,
    pub error: Option<String>,
}

impl BalanceSnapshot {
    pub fn from_sats(sats: u64, source: impl Into<String>) -> Self {
        Self {
            balance: format_sats(sats),
            source: source.into(),
            error: None,
        }
    }

    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            balance: String::new(),
            source: NO_SOURCE.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        !self.balance.is_empty()
    }

    /// Balance in satoshis, when available.
    pub fn sats(&self) -> Option<u64> {
        if !self.is_available() {
            return None;
        }
        parse_coin_amount(&self.balance)
            .ok()
            .and_then(|v| u64::try_from(v).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxDirection {
    Send,
    Receive,
}

impl std::fmt::Display for TxDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxDirection::Send => write!(f, "send"),
            TxDirection::Receive => write!(f, "receive"),
        }
    }
}

/// One on-chain transaction as seen from the wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub coin: String,
    #[serde(rename = "type")]
    pub direction: TxDirection,
    pub to: String,
    pub from: String,
    /// Net amount moved, 8-decimal coin string.
    pub amount: String,
    pub hash: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsSnapshot {
    pub transactions: Vec<TransactionRecord>,
    pub source: String,
    pub error: Option<String>,
}

impl TransactionsSnapshot {
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            transactions: Vec::new(),
            source: NO_SOURCE.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

/// Fee-rate as reported by a provider, before normalisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeeRate {
    SatsPerKb(u64),
    SatsPerVbyte(f64),
}

impl FeeRate {
    /// Absolute fee for a transaction of `vbytes`, rounded up.
    pub fn absolute_fee(self, vbytes: u64) -> u64 {
        match self {
            FeeRate::SatsPerKb(per_kb) => per_kb.saturating_mul(vbytes).div_ceil(1000),
            FeeRate::SatsPerVbyte(per_vb) => (per_vb * vbytes as f64).ceil().max(0.0) as u64,
        }
    }
}

/// Absolute fee for an assumed standard-size transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub fee_sats: u64,
    pub source: String,
    pub error: Option<String>,
}

impl FeeEstimate {
    pub fn is_fallback(&self) -> bool {
        self.source == NO_SOURCE
    }

    /// Fee as an 8-decimal coin string.
    pub fn fee_coin(&self) -> String {
        format_sats(self.fee_sats)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationStatus {
    pub confirmed: bool,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReceipt {
    pub txid: String,
    pub source: String,
}

/// Spot price in USD with the 24h change in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub usd: f64,
    pub usd_24h_change: f64,
}

/// An unspent output as reported by an indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: String,
    pub vout: u32,
    pub value_sat: u64,
}
