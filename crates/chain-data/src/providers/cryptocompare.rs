use async_trait::async_trait;
use serde_json::Value;

use super::{as_f64_lenient, field, validated_price};
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::provider::{PriceProvider, Provider};
use crate::types::PriceQuote;

/// CryptoCompare `pricemultifull`.
#[derive(Debug, Clone)]
pub struct CryptoCompare {
    http: HttpClient,
    base_url: String,
    symbol: String,
}

impl CryptoCompare {
    pub fn new(http: HttpClient, base_url: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            symbol: symbol.into(),
        }
    }
}

impl Provider for CryptoCompare {
    fn name(&self) -> &str {
        "CryptoCompare"
    }
}

#[async_trait]
impl PriceProvider for CryptoCompare {
    async fn price(&self) -> Result<PriceQuote, ProviderError> {
        let url = format!(
            "{}/pricemultifull?fsyms={}&tsyms=USD",
            self.base_url, self.symbol
        );
        parse_price_multi_full(&self.http.get_json(&url).await?, &self.symbol)
    }
}

/// `RAW.<symbol>.USD.{PRICE, CHANGEPCT24HOUR}`
pub fn parse_price_multi_full(body: &Value, symbol: &str) -> Result<PriceQuote, ProviderError> {
    let raw = field(body, &["RAW", symbol, "USD"])?;
    let usd = as_f64_lenient(field(raw, &["PRICE"])?, "PRICE")?;
    let change = match raw.get("CHANGEPCT24HOUR") {
        Some(v) if !v.is_null() => as_f64_lenient(v, "CHANGEPCT24HOUR")?,
        _ => 0.0,
    };
    validated_price(usd, change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_raw_section() {
        let body = json!({"RAW": {"LTC": {"USD": {"PRICE": 79.5, "CHANGEPCT24HOUR": 2.5}}}});
        let quote = parse_price_multi_full(&body, "LTC").unwrap();
        assert_eq!(quote.usd, 79.5);
        assert_eq!(quote.usd_24h_change, 2.5);
    }

    #[test]
    fn error_payload_is_missing_field() {
        let body = json!({"Response": "Error", "Message": "rate limit"});
        assert_eq!(
            parse_price_multi_full(&body, "LTC").unwrap_err(),
            ProviderError::MissingField("RAW.LTC.USD".into())
        );
    }
}
