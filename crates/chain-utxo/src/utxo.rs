use crate::error::UtxoError;

/// An unspent output owned by the wallet address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Transaction id in display (big-endian) hex.
    pub txid: String,
    pub vout: u32,
    pub value_sat: u64,
}

/// Greedy largest-first coin selection.
///
/// Walks the UTXOs in descending value order and stops as soon as the running
/// total covers `amount_sat + fee_sat`. Equal values keep their input order.
/// When the whole set cannot cover the target nothing is selected.
pub fn select_utxos(
    utxos: &[Utxo],
    amount_sat: u64,
    fee_sat: u64,
) -> Result<Vec<Utxo>, UtxoError> {
    let needed = amount_sat.checked_add(fee_sat).ok_or_else(|| {
        UtxoError::TransactionBuildError("amount plus fee overflows u64".into())
    })?;

    let mut sorted: Vec<&Utxo> = utxos.iter().collect();
    sorted.sort_by(|a, b| b.value_sat.cmp(&a.value_sat));

    let mut selected = Vec::new();
    let mut total: u64 = 0;

    for utxo in sorted {
        selected.push(utxo.clone());
        total = total.saturating_add(utxo.value_sat);
        if total >= needed {
            return Ok(selected);
        }
    }

    Err(UtxoError::InsufficientFunds {
        needed,
        available: total,
    })
}

/// Sum of UTXO values, saturating at `u64::MAX`.
pub fn total_value(utxos: &[Utxo]) -> u64 {
    utxos
        .iter()
        .fold(0u64, |acc, u| acc.saturating_add(u.value_sat))
}
