//! Chain data access for UTXO wallets.
//!
//! Every capability (balance, history, fee, broadcast, confirmation, UTXOs,
//! price) is served by an ordered list of public HTTP providers. A call
//! tries each provider in turn under a per-request timeout and returns the
//! first success tagged with the provider's name.

pub mod amount;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod http;
pub mod provider;
pub mod providers;
pub mod types;

pub use amount::{format_sats, net_balance, parse_coin_amount, SATS_PER_COIN};
pub use client::{ChainDataClient, ChainDataClientBuilder};
pub use config::{ChainDataConfig, CoinEndpoints};
pub use error::{AggregatedError, ProviderError};
pub use fallback::try_in_order;
pub use http::HttpClient;
pub use provider::{
    BalanceProvider, BroadcastProvider, ConfirmationProvider, FeeProvider, PriceProvider, Provider,
    TransactionsProvider, UtxoProvider,
};
pub use types::{
    BalanceSnapshot, BroadcastReceipt, ConfirmationStatus, FeeEstimate, FeeRate, PriceQuote,
    Sourced, TransactionRecord, TransactionsSnapshot, TxDirection, UnspentOutput, NO_SOURCE,
};
