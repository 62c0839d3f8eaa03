//! Conversions between satoshi integers and the 8-decimal strings shown to
//! users. Integer arithmetic only, so no value is ever rounded through `f64`.

use crate::error::ProviderError;

pub const SATS_PER_COIN: u64 = 100_000_000;
const DECIMALS: usize = 8;

/// Format satoshis as a fixed 8-decimal coin amount, e.g. `150000000 -> "1.50000000"`.
pub fn format_sats(sats: u64) -> String {
    format!("{}.{:08}", sats / SATS_PER_COIN, sats % SATS_PER_COIN)
}

/// Parse a decimal coin amount into signed satoshis.
///
/// Accepts an optional sign and up to eight fractional digits. Providers
/// report unconfirmed balances as negative when coins are leaving.
pub fn parse_coin_amount(text: &str) -> Result<i64, ProviderError> {
    let text = text.trim();
    let invalid = || ProviderError::Decode(format!("invalid coin amount {text:?}"));

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() {
        return Err(invalid());
    }

    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if frac.len() > DECIMALS
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
        || (whole.is_empty() && frac.is_empty())
    {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: i64 = format!("{frac:0<8}").parse().map_err(|_| invalid())?;

    let sats = whole
        .checked_mul(SATS_PER_COIN as i64)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(invalid)?;
    Ok(if negative { -sats } else { sats })
}

/// Confirmed plus unconfirmed satoshis, floored at zero.
pub fn net_balance(confirmed: i64, unconfirmed: i64) -> u64 {
    confirmed.saturating_add(unconfirmed).max(0) as u64
}
