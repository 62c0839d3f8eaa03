//! One trait per capability. A concrete provider implements only the
//! capabilities its API offers.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{FeeRate, PriceQuote, TransactionRecord, UnspentOutput};

/// Common identity of every provider.
pub trait Provider: Send + Sync {
    /// Name used in result tags and failure messages.
    fn name(&self) -> &str;
}

#[async_trait]
pub trait BalanceProvider: Provider {
    /// Confirmed plus unconfirmed balance in satoshis.
    async fn balance(&self, address: &str) -> Result<u64, ProviderError>;
}

#[async_trait]
pub trait TransactionsProvider: Provider {
    async fn transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, ProviderError>;
}

#[async_trait]
pub trait FeeProvider: Provider {
    async fn fee_rate(&self) -> Result<FeeRate, ProviderError>;
}

#[async_trait]
pub trait BroadcastProvider: Provider {
    /// Submit raw transaction hex; returns the txid reported by the provider.
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait ConfirmationProvider: Provider {
    /// `Ok(false)` means the provider answered and the tx is still unconfirmed.
    async fn is_confirmed(&self, txid: &str) -> Result<bool, ProviderError>;
}

#[async_trait]
pub trait UtxoProvider: Provider {
    async fn utxos(&self, address: &str) -> Result<Vec<UnspentOutput>, ProviderError>;
}

#[async_trait]
pub trait PriceProvider: Provider {
    async fn price(&self) -> Result<PriceQuote, ProviderError>;
}
