use async_trait::async_trait;
use serde_json::{json, Value};

use super::field;
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::provider::{BroadcastProvider, Provider};

/// chain.so v2 (`/send_tx/<network>`).
#[derive(Debug, Clone)]
pub struct ChainSo {
    http: HttpClient,
    base_url: String,
    network: String,
}

impl ChainSo {
    pub fn new(http: HttpClient, base_url: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            network: network.into(),
        }
    }
}

impl Provider for ChainSo {
    fn name(&self) -> &str {
        "chain.so"
    }
}

#[async_trait]
impl BroadcastProvider for ChainSo {
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, ProviderError> {
        let url = format!("{}/send_tx/{}", self.base_url, self.network);
        let body = self
            .http
            .post_json(&url, &json!({ "tx_hex": raw_tx_hex }))
            .await?;
        parse_send_tx(&body)
    }
}

pub fn parse_send_tx(body: &Value) -> Result<String, ProviderError> {
    if body.get("status").and_then(Value::as_str) == Some("fail") {
        return Err(ProviderError::InvalidPayload(format!(
            "send_tx rejected: {}",
            body.get("data").unwrap_or(&Value::Null)
        )));
    }
    let txid = field(body, &["data", "txid"])?
        .as_str()
        .unwrap_or_default()
        .trim();
    if txid.is_empty() {
        return Err(ProviderError::MissingField("data.txid".into()));
    }
    Ok(txid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_yields_txid() {
        let body = json!({"status": "success", "data": {"network": "LTC", "txid": "abcd"}});
        assert_eq!(parse_send_tx(&body).unwrap(), "abcd");
    }

    #[test]
    fn failure_status_is_rejected() {
        let body = json!({"status": "fail", "data": {"tx_hex": "missing inputs"}});
        assert!(matches!(
            parse_send_tx(&body),
            Err(ProviderError::InvalidPayload(_))
        ));
    }

    #[test]
    fn empty_txid_is_missing() {
        let body = json!({"status": "success", "data": {"txid": ""}});
        assert!(matches!(
            parse_send_tx(&body),
            Err(ProviderError::MissingField(_))
        ));
    }
}
