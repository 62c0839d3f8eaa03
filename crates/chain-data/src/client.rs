use std::sync::Arc;

use tracing::{info, warn};

use crate::amount::format_sats;
use crate::config::{ChainDataConfig, CoinEndpoints};
use crate::error::{AggregatedError, ProviderError};
use crate::fallback::try_in_order;
use crate::http::HttpClient;
use crate::provider::{
    BalanceProvider, BroadcastProvider, ConfirmationProvider, FeeProvider, PriceProvider,
    TransactionsProvider, UtxoProvider,
};
use crate::providers::{
    BlockCypher, Blockchair, ChainSo, CoinGecko, Coinbase, CryptoCompare, Esplora, SoChain,
};
use crate::types::{
    BalanceSnapshot, BroadcastReceipt, ConfirmationStatus, FeeEstimate, PriceQuote, Sourced,
    TransactionsSnapshot, UnspentOutput, NO_SOURCE,
};

/// One capability interface per operation over ordered provider lists.
///
/// Balance, history, fee and confirmation lookups never fail: when every
/// provider is exhausted they return a sentinel tagged `source = "none"`.
/// Broadcast, UTXO and price lookups return the aggregated failure instead,
/// since no sentinel for them would be safe to act on.
#[derive(Clone)]
pub struct ChainDataClient {
    config: ChainDataConfig,
    balance: Vec<Arc<dyn BalanceProvider>>,
    transactions: Vec<Arc<dyn TransactionsProvider>>,
    fee: Vec<Arc<dyn FeeProvider>>,
    broadcast: Vec<Arc<dyn BroadcastProvider>>,
    confirmation: Vec<Arc<dyn ConfirmationProvider>>,
    utxo: Vec<Arc<dyn UtxoProvider>>,
    price: Vec<Arc<dyn PriceProvider>>,
}

impl std::fmt::Debug for ChainDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |list: Vec<&str>| list.join(", ");
        f.debug_struct("ChainDataClient")
            .field("config", &self.config)
            .field("balance", &names(self.balance.iter().map(|p| p.name()).collect()))
            .field(
                "transactions",
                &names(self.transactions.iter().map(|p| p.name()).collect()),
            )
            .field("fee", &names(self.fee.iter().map(|p| p.name()).collect()))
            .field(
                "broadcast",
                &names(self.broadcast.iter().map(|p| p.name()).collect()),
            )
            .finish_non_exhaustive()
    }
}

impl ChainDataClient {
    /// The standard provider catalogue for one coin.
    pub fn new(endpoints: &CoinEndpoints, config: ChainDataConfig) -> Result<Self, ProviderError> {
        let http = HttpClient::new(config.request_timeout)?;

        let blockcypher = Arc::new(BlockCypher::new(
            http.clone(),
            &endpoints.blockcypher,
            &endpoints.symbol,
        ));
        let blockchair = Arc::new(Blockchair::new(
            http.clone(),
            &endpoints.blockchair,
            &endpoints.symbol,
        ));
        let sochain = Arc::new(SoChain::new(
            http.clone(),
            &endpoints.sochain,
            &endpoints.sochain_network,
        ));
        let esplora = Arc::new(Esplora::new(http.clone(), &endpoints.esplora, "Esplora"));
        let chainso = Arc::new(ChainSo::new(
            http.clone(),
            &endpoints.chainso,
            &endpoints.chainso_network,
        ));

        Ok(Self::builder(config)
            .balance_provider(blockcypher.clone())
            .balance_provider(blockchair.clone())
            .balance_provider(sochain)
            .transactions_provider(blockcypher.clone())
            .transactions_provider(blockchair.clone())
            .fee_provider(blockcypher.clone())
            .fee_provider(esplora.clone())
            .broadcast_provider(esplora.clone())
            .broadcast_provider(chainso)
            .broadcast_provider(blockcypher.clone())
            .confirmation_provider(blockcypher.clone())
            .confirmation_provider(blockchair)
            .utxo_provider(esplora)
            .utxo_provider(blockcypher)
            .price_provider(Arc::new(CoinGecko::new(
                http.clone(),
                &endpoints.coingecko,
                &endpoints.coingecko_id,
            )))
            .price_provider(Arc::new(CryptoCompare::new(
                http.clone(),
                &endpoints.cryptocompare,
                &endpoints.symbol,
            )))
            .price_provider(Arc::new(Coinbase::new(
                http,
                &endpoints.coinbase,
                &endpoints.symbol,
            )))
            .build())
    }

    /// An empty client to be filled with explicit providers.
    pub fn builder(config: ChainDataConfig) -> ChainDataClientBuilder {
        ChainDataClientBuilder {
            client: Self {
                config,
                balance: Vec::new(),
                transactions: Vec::new(),
                fee: Vec::new(),
                broadcast: Vec::new(),
                confirmation: Vec::new(),
                utxo: Vec::new(),
                price: Vec::new(),
            },
        }
    }

    pub fn config(&self) -> &ChainDataConfig {
        &self.config
    }

    /// Balance as an 8-decimal string, or the empty-string sentinel.
    pub async fn get_balance(&self, address: &str) -> BalanceSnapshot {
        let address = address.to_string();
        let result = try_in_order(
            "balance",
            &self.balance,
            self.config.request_timeout,
            |p| {
                let address = address.clone();
                async move { p.balance(&address).await }
            },
        )
        .await;

        match result {
            Ok(Sourced { value, source }) => BalanceSnapshot::from_sats(value, source),
            Err(err) => {
                warn!(error = %err, "balance unavailable");
                BalanceSnapshot::unavailable(err.reasons())
            }
        }
    }

    /// History sorted newest first, or the empty-list sentinel.
    pub async fn get_transactions(&self, address: &str) -> TransactionsSnapshot {
        let address = address.to_string();
        let limit = self.config.tx_history_limit;
        let result = try_in_order(
            "transactions",
            &self.transactions,
            self.config.request_timeout,
            |p| {
                let address = address.clone();
                async move { p.transactions(&address, limit).await }
            },
        )
        .await;

        match result {
            Ok(Sourced {
                value: mut transactions,
                source,
            }) => {
                transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                transactions.truncate(limit);
                TransactionsSnapshot {
                    transactions,
                    source,
                    error: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "transaction history unavailable");
                TransactionsSnapshot::unavailable(err.reasons())
            }
        }
    }

    /// Absolute fee for an assumed-size transaction, or the configured
    /// conservative fallback.
    pub async fn estimate_fee(&self) -> FeeEstimate {
        let result = try_in_order("fee", &self.fee, self.config.request_timeout, |p| async move {
            p.fee_rate().await
        })
        .await;

        match result {
            Ok(Sourced { value, source }) => FeeEstimate {
                fee_sats: value.absolute_fee(self.config.assumed_tx_vbytes),
                source,
                error: None,
            },
            Err(err) => {
                warn!(
                    error = %err,
                    fallback = %format_sats(self.config.fallback_fee_sats),
                    "fee estimate unavailable, using fallback"
                );
                FeeEstimate {
                    fee_sats: self.config.fallback_fee_sats,
                    source: NO_SOURCE.to_string(),
                    error: Some(err.reasons()),
                }
            }
        }
    }

    /// Submit raw transaction hex to the first endpoint that accepts it.
    pub async fn broadcast(&self, raw_tx_hex: &str) -> Result<BroadcastReceipt, AggregatedError> {
        let raw = raw_tx_hex.to_string();
        let Sourced { value, source } = try_in_order(
            "broadcast",
            &self.broadcast,
            self.config.request_timeout,
            |p| {
                let raw = raw.clone();
                async move { p.broadcast(&raw).await }
            },
        )
        .await?;

        info!(txid = %value, source = %source, "transaction broadcast");
        Ok(BroadcastReceipt {
            txid: value,
            source,
        })
    }

    /// Whether the transaction is mined; `confirmed: false, source: "none"`
    /// when no provider answered.
    pub async fn check_confirmation(&self, txid: &str) -> ConfirmationStatus {
        let txid = txid.to_string();
        let result = try_in_order(
            "confirmation",
            &self.confirmation,
            self.config.request_timeout,
            |p| {
                let txid = txid.clone();
                async move { p.is_confirmed(&txid).await }
            },
        )
        .await;

        match result {
            Ok(Sourced { value, source }) => ConfirmationStatus {
                confirmed: value,
                source,
            },
            Err(_) => ConfirmationStatus {
                confirmed: false,
                source: NO_SOURCE.to_string(),
            },
        }
    }

    /// Current unspent outputs of an address, fetched fresh on every call.
    pub async fn get_utxos(
        &self,
        address: &str,
    ) -> Result<Sourced<Vec<UnspentOutput>>, AggregatedError> {
        let address = address.to_string();
        try_in_order("utxo", &self.utxo, self.config.request_timeout, |p| {
            let address = address.clone();
            async move { p.utxos(&address).await }
        })
        .await
    }

    /// USD spot price. A provider returning a non-positive price counts as failed.
    pub async fn get_price(&self) -> Result<Sourced<PriceQuote>, AggregatedError> {
        try_in_order("price", &self.price, self.config.request_timeout, |p| async move {
            p.price().await
        })
        .await
    }
}

/// Assembles a [`ChainDataClient`] from explicit providers, in call order.
pub struct ChainDataClientBuilder {
    client: ChainDataClient,
}

impl ChainDataClientBuilder {
    pub fn balance_provider(mut self, provider: Arc<dyn BalanceProvider>) -> Self {
        self.client.balance.push(provider);
        self
    }

    pub fn transactions_provider(mut self, provider: Arc<dyn TransactionsProvider>) -> Self {
        self.client.transactions.push(provider);
        self
    }

    pub fn fee_provider(mut self, provider: Arc<dyn FeeProvider>) -> Self {
        self.client.fee.push(provider);
        self
    }

    pub fn broadcast_provider(mut self, provider: Arc<dyn BroadcastProvider>) -> Self {
        self.client.broadcast.push(provider);
        self
    }

    pub fn confirmation_provider(mut self, provider: Arc<dyn ConfirmationProvider>) -> Self {
        self.client.confirmation.push(provider);
        self
    }

    pub fn utxo_provider(mut self, provider: Arc<dyn UtxoProvider>) -> Self {
        self.client.utxo.push(provider);
        self
    }

    pub fn price_provider(mut self, provider: Arc<dyn PriceProvider>) -> Self {
        self.client.price.push(provider);
        self
    }

    pub fn build(self) -> ChainDataClient {
        self.client
    }
}
