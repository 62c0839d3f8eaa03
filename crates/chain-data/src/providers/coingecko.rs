use async_trait::async_trait;
use serde_json::Value;

use super::{as_f64_lenient, field, validated_price};
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::provider::{PriceProvider, Provider};
use crate::types::PriceQuote;

/// CoinGecko `simple/price`.
#[derive(Debug, Clone)]
pub struct CoinGecko {
    http: HttpClient,
    base_url: String,
    coin_id: String,
}

impl CoinGecko {
    pub fn new(http: HttpClient, base_url: impl Into<String>, coin_id: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            coin_id: coin_id.into(),
        }
    }
}

impl Provider for CoinGecko {
    fn name(&self) -> &str {
        "CoinGecko"
    }
}

#[async_trait]
impl PriceProvider for CoinGecko {
    async fn price(&self) -> Result<PriceQuote, ProviderError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.base_url, self.coin_id
        );
        parse_simple_price(&self.http.get_json(&url).await?, &self.coin_id)
    }
}

pub fn parse_simple_price(body: &Value, coin_id: &str) -> Result<PriceQuote, ProviderError> {
    let usd = as_f64_lenient(field(body, &[coin_id, "usd"])?, "usd")?;
    let change = match body.get(coin_id).and_then(|c| c.get("usd_24h_change")) {
        Some(v) if !v.is_null() => as_f64_lenient(v, "usd_24h_change")?,
        _ => 0.0,
    };
    validated_price(usd, change)
}
