use crypto_utils::sha256d;

use crate::error::UtxoError;
use crate::transaction::{TxSkeleton, SIGHASH_ALL};

/// BIP-143 scriptCode for a P2WPKH input, length prefix included:
/// `0x19 OP_DUP OP_HASH160 0x14 <pubkey hash> OP_EQUALVERIFY OP_CHECKSIG`.
pub fn p2wpkh_script_code(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(26);
    script.push(0x19);
    script.push(0x76);
    script.push(0xa9);
    script.push(0x14);
    script.extend_from_slice(pubkey_hash);
    script.push(0x88);
    script.push(0xac);
    script
}

/// BIP-143 signature hash (SIGHASH_ALL) for one input of a SegWit v0 transaction.
///
/// `script_code` must already carry its length prefix. The preimage is
/// `version || hashPrevouts || hashSequence || outpoint || scriptCode ||
/// value || sequence || hashOutputs || locktime || sighash type`, and the
/// result is its double SHA-256.
pub fn compute_bip143_sighash(
    tx: &TxSkeleton,
    input_index: usize,
    script_code: &[u8],
    input_value: u64,
) -> Result<[u8; 32], UtxoError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        UtxoError::SigningError(format!("input index {input_index} out of bounds"))
    })?;

    let hash_prevouts = {
        let mut data = Vec::with_capacity(tx.inputs.len() * 36);
        for inp in &tx.inputs {
            data.extend_from_slice(&inp.prev_txid);
            data.extend_from_slice(&inp.prev_vout.to_le_bytes());
        }
        sha256d(&data)
    };

    let hash_sequence = {
        let mut data = Vec::with_capacity(tx.inputs.len() * 4);
        for inp in &tx.inputs {
            data.extend_from_slice(&inp.sequence.to_le_bytes());
        }
        sha256d(&data)
    };

    let hash_outputs = {
        let mut data = Vec::new();
        for out in &tx.outputs {
            out.write_to(&mut data);
        }
        sha256d(&data)
    };

    let mut preimage = Vec::with_capacity(156 + script_code.len());
    preimage.extend_from_slice(&tx.version.to_le_bytes());
    preimage.extend_from_slice(&hash_prevouts);
    preimage.extend_from_slice(&hash_sequence);
    preimage.extend_from_slice(&input.prev_txid);
    preimage.extend_from_slice(&input.prev_vout.to_le_bytes());
    preimage.extend_from_slice(script_code);
    preimage.extend_from_slice(&input_value.to_le_bytes());
    preimage.extend_from_slice(&input.sequence.to_le_bytes());
    preimage.extend_from_slice(&hash_outputs);
    preimage.extend_from_slice(&tx.lock_time.to_le_bytes());
    preimage.extend_from_slice(&(SIGHASH_ALL as u32).to_le_bytes());

    Ok(sha256d(&preimage))
}
