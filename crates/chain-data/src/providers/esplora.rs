use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::as_f64_lenient;
use crate::config::ESPLORA_FEE_TARGET_BLOCKS;
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::provider::{BroadcastProvider, FeeProvider, Provider, UtxoProvider};
use crate::types::{FeeRate, UnspentOutput};

/// Esplora-compatible indexer (litecoinspace.org, blockstream.info).
#[derive(Debug, Clone)]
pub struct Esplora {
    http: HttpClient,
    base_url: String,
    name: String,
}

impl Esplora {
    pub fn new(http: HttpClient, base_url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            name: name.into(),
        }
    }
}

impl Provider for Esplora {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl UtxoProvider for Esplora {
    async fn utxos(&self, address: &str) -> Result<Vec<UnspentOutput>, ProviderError> {
        let url = format!("{}/address/{address}/utxo", self.base_url);
        parse_utxos(self.http.get_json(&url).await?)
    }
}

#[async_trait]
impl FeeProvider for Esplora {
    async fn fee_rate(&self) -> Result<FeeRate, ProviderError> {
        let url = format!("{}/fee-estimates", self.base_url);
        parse_fee_estimates(&self.http.get_json(&url).await?, ESPLORA_FEE_TARGET_BLOCKS)
    }
}

#[async_trait]
impl BroadcastProvider for Esplora {
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, ProviderError> {
        let url = format!("{}/tx", self.base_url);
        let body = self.http.post_text(&url, raw_tx_hex.to_string()).await?;
        parse_broadcast_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct EsploraUtxo {
    txid: String,
    vout: u32,
    value: u64,
}

pub fn parse_utxos(body: Value) -> Result<Vec<UnspentOutput>, ProviderError> {
    if !body.is_array() {
        return Err(ProviderError::Decode("utxo response is not an array".into()));
    }
    let utxos: Vec<EsploraUtxo> = serde_json::from_value(body)?;
    Ok(utxos
        .into_iter()
        .map(|u| UnspentOutput {
            txid: u.txid,
            vout: u.vout,
            value_sat: u.value,
        })
        .collect())
}

/// sat/vB for `target` blocks from a `{"<blocks>": rate}` map.
pub fn parse_fee_estimates(body: &Value, target: u32) -> Result<FeeRate, ProviderError> {
    let key = target.to_string();
    let rate = body
        .get(&key)
        .ok_or_else(|| ProviderError::MissingField(key.clone()))?;
    let rate = as_f64_lenient(rate, &key)?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ProviderError::InvalidPayload(format!(
            "fee rate must be positive, got {rate}"
        )));
    }
    Ok(FeeRate::SatsPerVbyte(rate))
}

/// The body is the bare txid.
pub fn parse_broadcast_response(body: &str) -> Result<String, ProviderError> {
    let txid = body.trim();
    if txid.len() != 64 || !txid.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProviderError::InvalidPayload(format!(
            "expected txid, got {txid:?}"
        )));
    }
    Ok(txid.to_string())
}
