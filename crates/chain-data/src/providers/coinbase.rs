use async_trait::async_trait;
use serde_json::Value;

use super::{as_f64_lenient, field, validated_price};
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::provider::{PriceProvider, Provider};
use crate::types::PriceQuote;

/// Coinbase spot price. Carries no 24h change, so it reports zero.
#[derive(Debug, Clone)]
pub struct Coinbase {
    http: HttpClient,
    base_url: String,
    symbol: String,
}

impl Coinbase {
    pub fn new(http: HttpClient, base_url: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            symbol: symbol.into(),
        }
    }
}

impl Provider for Coinbase {
    fn name(&self) -> &str {
        "Coinbase"
    }
}

#[async_trait]
impl PriceProvider for Coinbase {
    async fn price(&self) -> Result<PriceQuote, ProviderError> {
        let url = format!("{}/prices/{}-USD/spot", self.base_url, self.symbol);
        parse_spot_price(&self.http.get_json(&url).await?)
    }
}

pub fn parse_spot_price(body: &Value) -> Result<PriceQuote, ProviderError> {
    let usd = as_f64_lenient(field(body, &["data", "amount"])?, "amount")?;
    validated_price(usd, 0.0)
}
