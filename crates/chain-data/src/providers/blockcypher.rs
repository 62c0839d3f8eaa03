use async_trait::async_trait;
use serde_json::{json, Value};

use super::{as_i64, field};
use crate::amount::{format_sats, net_balance};
use crate::config::DEFAULT_FEE_PER_KB;
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::provider::{
    BalanceProvider, BroadcastProvider, ConfirmationProvider, FeeProvider, Provider,
    TransactionsProvider, UtxoProvider,
};
use crate::types::{FeeRate, TransactionRecord, TxDirection, UnspentOutput};

/// BlockCypher REST API (`/v1/<coin>/main`).
#[derive(Debug, Clone)]
pub struct BlockCypher {
    http: HttpClient,
    base_url: String,
    symbol: String,
}

impl BlockCypher {
    pub fn new(http: HttpClient, base_url: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            symbol: symbol.into(),
        }
    }
}

impl Provider for BlockCypher {
    fn name(&self) -> &str {
        "BlockCypher"
    }
}

#[async_trait]
impl BalanceProvider for BlockCypher {
    async fn balance(&self, address: &str) -> Result<u64, ProviderError> {
        let url = format!("{}/addrs/{address}/balance", self.base_url);
        parse_balance(&self.http.get_json(&url).await?)
    }
}

#[async_trait]
impl TransactionsProvider for BlockCypher {
    async fn transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, ProviderError> {
        let url = format!("{}/addrs/{address}/full?limit={limit}", self.base_url);
        let body = self.http.get_json(&url).await?;
        parse_full_transactions(&body, address, &self.symbol, chrono::Utc::now().timestamp_millis())
    }
}

#[async_trait]
impl FeeProvider for BlockCypher {
    async fn fee_rate(&self) -> Result<FeeRate, ProviderError> {
        parse_fee_rate(&self.http.get_json(&self.base_url).await?)
    }
}

#[async_trait]
impl BroadcastProvider for BlockCypher {
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, ProviderError> {
        let url = format!("{}/txs/push", self.base_url);
        let body = self.http.post_json(&url, &json!({ "tx": raw_tx_hex })).await?;
        parse_push_response(&body)
    }
}

#[async_trait]
impl ConfirmationProvider for BlockCypher {
    async fn is_confirmed(&self, txid: &str) -> Result<bool, ProviderError> {
        let url = format!("{}/txs/{txid}", self.base_url);
        parse_confirmation(&self.http.get_json(&url).await?)
    }
}

#[async_trait]
impl UtxoProvider for BlockCypher {
    async fn utxos(&self, address: &str) -> Result<Vec<UnspentOutput>, ProviderError> {
        let url = format!(
            "{}/addrs/{address}?unspentOnly=true&includeScript=false",
            self.base_url
        );
        parse_utxos(&self.http.get_json(&url).await?)
    }
}

/// `balance + unconfirmed_balance`, both in satoshis.
pub fn parse_balance(body: &Value) -> Result<u64, ProviderError> {
    let confirmed = as_i64(field(body, &["balance"])?, "balance")?;
    let unconfirmed = match body.get("unconfirmed_balance") {
        Some(v) if !v.is_null() => as_i64(v, "unconfirmed_balance")?,
        _ => 0,
    };
    Ok(net_balance(confirmed, unconfirmed))
}

/// `medium_fee_per_kb`, defaulting when the field is absent.
pub fn parse_fee_rate(body: &Value) -> Result<FeeRate, ProviderError> {
    if !body.is_object() {
        return Err(ProviderError::Decode("chain info is not an object".into()));
    }
    let per_kb = match body.get("medium_fee_per_kb") {
        Some(v) if !v.is_null() => as_i64(v, "medium_fee_per_kb")?,
        _ => 0,
    };
    let per_kb = if per_kb > 0 {
        per_kb as u64
    } else {
        DEFAULT_FEE_PER_KB
    };
    Ok(FeeRate::SatsPerKb(per_kb))
}

pub fn parse_push_response(body: &Value) -> Result<String, ProviderError> {
    let hash = field(body, &["tx", "hash"])?
        .as_str()
        .unwrap_or_default()
        .trim();
    if hash.is_empty() {
        return Err(ProviderError::MissingField("tx.hash".into()));
    }
    Ok(hash.to_string())
}

pub fn parse_confirmation(body: &Value) -> Result<bool, ProviderError> {
    if !body.is_object() {
        return Err(ProviderError::Decode("transaction is not an object".into()));
    }
    let confirmations = match body.get("confirmations") {
        Some(v) if !v.is_null() => as_i64(v, "confirmations")?,
        _ => 0,
    };
    Ok(confirmations > 0)
}

/// Confirmed and unconfirmed `txrefs` of an `unspentOnly` address query.
pub fn parse_utxos(body: &Value) -> Result<Vec<UnspentOutput>, ProviderError> {
    if !body.is_object() {
        return Err(ProviderError::Decode("address is not an object".into()));
    }
    let refs = ["txrefs", "unconfirmed_txrefs"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_array))
        .flatten();

    let mut utxos = Vec::new();
    for r in refs {
        let txid = field(r, &["tx_hash"])?
            .as_str()
            .ok_or_else(|| ProviderError::Decode("tx_hash is not a string".into()))?;
        let vout = as_i64(field(r, &["tx_output_n"])?, "tx_output_n")?;
        let value = as_i64(field(r, &["value"])?, "value")?;
        let vout = u32::try_from(vout)
            .map_err(|_| ProviderError::Decode(format!("tx_output_n out of range: {vout}")))?;
        let value_sat = u64::try_from(value)
            .map_err(|_| ProviderError::Decode(format!("negative utxo value: {value}")))?;
        utxos.push(UnspentOutput {
            txid: txid.to_string(),
            vout,
            value_sat,
        });
    }
    Ok(utxos)
}

/// Normalise `/addrs/<a>/full` into records seen from `address`.
///
/// A transaction is a send when any input spends from the address; its
/// amount is then the total paid to other addresses. Otherwise it is a
/// receive of the outputs paying the address.
pub fn parse_full_transactions(
    body: &Value,
    address: &str,
    symbol: &str,
    now_ms: i64,
) -> Result<Vec<TransactionRecord>, ProviderError> {
    let Some(txs) = body.get("txs").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let owned = |entry: &Value| -> bool {
        entry
            .get("addresses")
            .and_then(Value::as_array)
            .map(|addrs| {
                addrs
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|a| a.eq_ignore_ascii_case(address))
            })
            .unwrap_or(false)
    };
    let first_address = |entry: &Value| -> String {
        entry
            .get("addresses")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let empty = Vec::new();

    let mut records = Vec::with_capacity(txs.len());
    for tx in txs {
        let hash = field(tx, &["hash"])?
            .as_str()
            .ok_or_else(|| ProviderError::Decode("hash is not a string".into()))?;
        let inputs = tx.get("inputs").and_then(Value::as_array).unwrap_or(&empty);
        let outputs = tx.get("outputs").and_then(Value::as_array).unwrap_or(&empty);

        let is_send = inputs.iter().any(&owned);
        let amount: i64 = outputs
            .iter()
            .filter(|out| owned(*out) != is_send)
            .map(|out| out.get("value").and_then(Value::as_i64).unwrap_or(0))
            .sum();

        let (direction, to, from) = if is_send {
            let to = outputs
                .iter()
                .find(|out| !owned(*out))
                .map(first_address)
                .unwrap_or_default();
            (TxDirection::Send, to, address.to_string())
        } else {
            let from = inputs.first().map(first_address).unwrap_or_default();
            (TxDirection::Receive, address.to_string(), from)
        };

        let timestamp = ["confirmed", "received"]
            .iter()
            .filter_map(|key| tx.get(*key).and_then(Value::as_str))
            .find_map(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(now_ms);

        records.push(TransactionRecord {
            coin: symbol.to_string(),
            direction,
            to,
            from,
            amount: format_sats(amount.max(0) as u64),
            hash: hash.to_string(),
            timestamp,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: &str = "ltc1qjmxnz78nmc8nq77wuxh25n2es7rzm5c2rkk4wh";
    const OTHER: &str = "ltc1qw508d6qejxtdg4y5r3zarvary0c5xw7kgmn4n9";
    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn balance_adds_unconfirmed() {
        let body = json!({
            "address": ME,
            "balance": 150000000,
            "unconfirmed_balance": -20000000,
            "final_balance": 130000000
        });
        assert_eq!(parse_balance(&body).unwrap(), 130_000_000);
    }

    #[test]
    fn balance_requires_field() {
        assert_eq!(
            parse_balance(&json!({"error": "rate limited"})).unwrap_err(),
            ProviderError::MissingField("balance".into())
        );
    }

    #[test]
    fn fee_rate_defaults_when_missing() {
        assert_eq!(
            parse_fee_rate(&json!({"medium_fee_per_kb": 25000})).unwrap(),
            FeeRate::SatsPerKb(25_000)
        );
        assert_eq!(
            parse_fee_rate(&json!({"name": "LTC.main"})).unwrap(),
            FeeRate::SatsPerKb(10_000)
        );
    }

    #[test]
    fn push_response_yields_hash() {
        let body = json!({"tx": {"hash": "abcd", "fees": 2500}});
        assert_eq!(parse_push_response(&body).unwrap(), "abcd");
        assert!(parse_push_response(&json!({"tx": {"hash": ""}})).is_err());
        assert!(parse_push_response(&json!({"error": "bad tx"})).is_err());
    }

    #[test]
    fn confirmation_counts() {
        assert!(parse_confirmation(&json!({"confirmations": 3})).unwrap());
        assert!(!parse_confirmation(&json!({"confirmations": 0})).unwrap());
        assert!(!parse_confirmation(&json!({"hash": "ab"})).unwrap());
    }

    #[test]
    fn utxos_include_unconfirmed_refs() {
        let body = json!({
            "txrefs": [
                {"tx_hash": "aa", "tx_output_n": 0, "value": 50000},
                {"tx_hash": "bb", "tx_output_n": 2, "value": 70000}
            ],
            "unconfirmed_txrefs": [
                {"tx_hash": "cc", "tx_output_n": 1, "value": 1000}
            ]
        });
        let utxos = parse_utxos(&body).unwrap();
        assert_eq!(utxos.len(), 3);
        assert_eq!(utxos[1].vout, 2);
        assert_eq!(utxos[2].value_sat, 1000);
        assert!(parse_utxos(&json!({"balance": 0})).unwrap().is_empty());
    }

    #[test]
    fn receive_transaction() {
        let body = json!({"txs": [{
            "hash": "rx",
            "confirmed": "2024-01-15T10:20:30Z",
            "inputs": [{"addresses": [OTHER]}],
            "outputs": [
                {"addresses": [ME], "value": 25000000},
                {"addresses": [OTHER], "value": 5000}
            ]
        }]});
        let records = parse_full_transactions(&body, ME, "LTC", NOW).unwrap();
        let r = &records[0];
        assert_eq!(r.direction, TxDirection::Receive);
        assert_eq!(r.amount, "0.25000000");
        assert_eq!(r.from, OTHER);
        assert_eq!(r.to, ME);
        assert_eq!(r.timestamp, 1_705_314_030_000);
    }

    #[test]
    fn send_transaction_excludes_change() {
        let body = json!({"txs": [{
            "hash": "tx",
            "inputs": [{"addresses": [ME.to_uppercase()]}],
            "outputs": [
                {"addresses": [OTHER], "value": 10000000},
                {"addresses": [ME], "value": 39997500}
            ]
        }]});
        let records = parse_full_transactions(&body, ME, "LTC", NOW).unwrap();
        let r = &records[0];
        assert_eq!(r.direction, TxDirection::Send);
        assert_eq!(r.amount, "0.10000000");
        assert_eq!(r.to, OTHER);
        assert_eq!(r.from, ME);
        assert_eq!(r.timestamp, NOW);
    }

    #[test]
    fn missing_txs_is_empty_history() {
        let body = json!({"address": ME, "n_tx": 0});
        assert!(parse_full_transactions(&body, ME, "LTC", NOW).unwrap().is_empty());
    }
}
