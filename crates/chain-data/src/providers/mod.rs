//! Concrete HTTP providers. Each one normalises its own payload shape in a
//! pure `parse_*` function so the mapping can be tested without a network.

pub mod blockchair;
pub mod blockcypher;
pub mod chainso;
pub mod coinbase;
pub mod coingecko;
pub mod cryptocompare;
pub mod esplora;
pub mod sochain;

pub use blockchair::Blockchair;
pub use blockcypher::BlockCypher;
pub use chainso::ChainSo;
pub use coinbase::Coinbase;
pub use coingecko::CoinGecko;
pub use cryptocompare::CryptoCompare;
pub use esplora::Esplora;
pub use sochain::SoChain;

use serde_json::Value;

use crate::error::ProviderError;
use crate::types::PriceQuote;

/// Follow a path of object keys, failing with the dotted path when absent.
pub(crate) fn field<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value, ProviderError> {
    let mut current = value;
    for key in path {
        current = current
            .get(*key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ProviderError::MissingField(path.join(".")))?;
    }
    Ok(current)
}

/// Integer field, also accepting integral floats (`1.0`).
pub(crate) fn as_i64(value: &Value, name: &str) -> Result<i64, ProviderError> {
    if let Some(v) = value.as_i64() {
        return Ok(v);
    }
    match value.as_f64() {
        Some(v) if v.fract() == 0.0 && v.is_finite() => Ok(v as i64),
        _ => Err(ProviderError::Decode(format!("{name} is not an integer"))),
    }
}

/// Number that some APIs send as a JSON string.
pub(crate) fn as_f64_lenient(value: &Value, name: &str) -> Result<f64, ProviderError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ProviderError::Decode(format!("{name} is not a number"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ProviderError::Decode(format!("{name} is not a number: {s:?}"))),
        _ => Err(ProviderError::Decode(format!("{name} is not a number"))),
    }
}

/// Reject a price that is not a finite positive number.
pub(crate) fn validated_price(usd: f64, usd_24h_change: f64) -> Result<PriceQuote, ProviderError> {
    if !usd.is_finite() || usd <= 0.0 {
        return Err(ProviderError::InvalidPayload(format!(
            "price must be positive, got {usd}"
        )));
    }
    let usd_24h_change = if usd_24h_change.is_finite() {
        usd_24h_change
    } else {
        0.0
    };
    Ok(PriceQuote {
        usd,
        usd_24h_change,
    })
}
