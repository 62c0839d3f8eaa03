use async_trait::async_trait;
use serde_json::Value;

use super::{as_i64, field};
use crate::amount::format_sats;
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::provider::{BalanceProvider, ConfirmationProvider, Provider, TransactionsProvider};
use crate::types::{TransactionRecord, TxDirection};

/// Blockchair dashboards API (`https://api.blockchair.com/<chain>`).
#[derive(Debug, Clone)]
pub struct Blockchair {
    http: HttpClient,
    base_url: String,
    symbol: String,
}

impl Blockchair {
    pub fn new(http: HttpClient, base_url: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            symbol: symbol.into(),
        }
    }
}

impl Provider for Blockchair {
    fn name(&self) -> &str {
        "Blockchair"
    }
}

#[async_trait]
impl BalanceProvider for Blockchair {
    async fn balance(&self, address: &str) -> Result<u64, ProviderError> {
        let url = format!("{}/dashboards/address/{address}", self.base_url);
        parse_balance(&self.http.get_json(&url).await?, address)
    }
}

#[async_trait]
impl TransactionsProvider for Blockchair {
    async fn transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, ProviderError> {
        let url = format!(
            "{}/dashboards/address/{address}?limit={limit}&transaction_details=true",
            self.base_url
        );
        let body = self.http.get_json(&url).await?;
        parse_transactions(
            &body,
            address,
            &self.symbol,
            limit,
            chrono::Utc::now().timestamp_millis(),
        )
    }
}

#[async_trait]
impl ConfirmationProvider for Blockchair {
    async fn is_confirmed(&self, txid: &str) -> Result<bool, ProviderError> {
        let url = format!("{}/dashboards/transaction/{txid}", self.base_url);
        parse_confirmation(&self.http.get_json(&url).await?, txid)
    }
}

/// Dashboard entry for `key`. Blockchair keys the `data` object by the
/// queried string, so fall back to the only entry when casing differs.
fn dashboard_entry<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    let data = body.get("data")?.as_object()?;
    if let Some(entry) = data.get(key) {
        return Some(entry);
    }
    if data.len() == 1 {
        return data.values().next();
    }
    None
}

/// `data[address].address.balance`, in satoshis.
pub fn parse_balance(body: &Value, address: &str) -> Result<u64, ProviderError> {
    let entry = dashboard_entry(body, address)
        .ok_or_else(|| ProviderError::MissingField(format!("data.{address}")))?;
    let balance = as_i64(field(entry, &["address", "balance"])?, "balance")?;
    Ok(balance.max(0) as u64)
}

/// History from an address dashboard.
///
/// With `transaction_details=true` each entry carries `hash`, `time` and
/// `balance_change`; the plain form lists bare hashes, which become receive
/// records with a zero amount stamped `now_ms`.
pub fn parse_transactions(
    body: &Value,
    address: &str,
    symbol: &str,
    limit: usize,
    now_ms: i64,
) -> Result<Vec<TransactionRecord>, ProviderError> {
    let Some(entries) = dashboard_entry(body, address)
        .and_then(|entry| entry.get("transactions"))
        .and_then(Value::as_array)
    else {
        return Ok(Vec::new());
    };

    let mut records = Vec::with_capacity(entries.len().min(limit));
    for entry in entries.iter().take(limit) {
        let record = match entry {
            Value::String(hash) => TransactionRecord {
                coin: symbol.to_string(),
                direction: TxDirection::Receive,
                to: address.to_string(),
                from: String::new(),
                amount: "0".to_string(),
                hash: hash.clone(),
                timestamp: now_ms,
            },
            Value::Object(_) => {
                let hash = field(entry, &["hash"])?
                    .as_str()
                    .ok_or_else(|| ProviderError::Decode("hash is not a string".into()))?;
                let change = match entry.get("balance_change") {
                    Some(v) if !v.is_null() => as_i64(v, "balance_change")?,
                    _ => 0,
                };
                let timestamp = entry
                    .get("time")
                    .and_then(Value::as_str)
                    .and_then(|t| {
                        chrono::NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S").ok()
                    })
                    .map(|dt| dt.and_utc().timestamp_millis())
                    .unwrap_or(now_ms);
                let (direction, to, from) = if change < 0 {
                    (TxDirection::Send, String::new(), address.to_string())
                } else {
                    (TxDirection::Receive, address.to_string(), String::new())
                };
                TransactionRecord {
                    coin: symbol.to_string(),
                    direction,
                    to,
                    from,
                    amount: format_sats(change.unsigned_abs()),
                    hash: hash.to_string(),
                    timestamp,
                }
            }
            _ => {
                return Err(ProviderError::Decode(
                    "transaction entry is neither a hash nor an object".into(),
                ))
            }
        };
        records.push(record);
    }
    Ok(records)
}

/// `data[txid].transaction.block_id > 0`. An unknown transaction is
/// reported as unconfirmed rather than as a failure.
pub fn parse_confirmation(body: &Value, txid: &str) -> Result<bool, ProviderError> {
    if body.get("data").is_none() {
        return Err(ProviderError::MissingField("data".into()));
    }
    let block_id = dashboard_entry(body, txid)
        .and_then(|entry| entry.get("transaction"))
        .and_then(|tx| tx.get("block_id"))
        .and_then(Value::as_i64)
        .unwrap_or(-1);
    Ok(block_id > 0)
}
