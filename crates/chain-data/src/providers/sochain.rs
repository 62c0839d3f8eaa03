use async_trait::async_trait;
use serde_json::Value;

use super::field;
use crate::amount::{net_balance, parse_coin_amount};
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::provider::{BalanceProvider, Provider};

/// SoChain v3 (`/balance/<network>/<address>`).
#[derive(Debug, Clone)]
pub struct SoChain {
    http: HttpClient,
    base_url: String,
    network: String,
}

impl SoChain {
    pub fn new(http: HttpClient, base_url: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            network: network.into(),
        }
    }
}

impl Provider for SoChain {
    fn name(&self) -> &str {
        "SoChain"
    }
}

#[async_trait]
impl BalanceProvider for SoChain {
    async fn balance(&self, address: &str) -> Result<u64, ProviderError> {
        let url = format!("{}/balance/{}/{address}", self.base_url, self.network);
        parse_balance(&self.http.get_json(&url).await?)
    }
}

/// Confirmed plus unconfirmed decimal strings under `data`.
pub fn parse_balance(body: &Value) -> Result<u64, ProviderError> {
    let data = field(body, &["data"])?;
    let amount = |key: &str| -> Result<i64, ProviderError> {
        match data.get(key) {
            Some(Value::String(s)) => parse_coin_amount(s),
            Some(Value::Null) | None => Ok(0),
            Some(other) => Err(ProviderError::Decode(format!("{key} is not a string: {other}"))),
        }
    };
    Ok(net_balance(amount("confirmed_balance")?, amount("unconfirmed_balance")?))
}
