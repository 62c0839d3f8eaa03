//! The native P2WPKH example from BIP-143, reproduced end to end.

use chain_utxo::sighash::{compute_bip143_sighash, p2wpkh_script_code};
use chain_utxo::transaction::{sign_input, TxInput, TxOutput, TxSkeleton};

const UNSIGNED_TX_HEX: &str = "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac11000000";
const PRIVATE_KEY_HEX: &str = "619c335025c7f4012e556c2a58b2506e30b8511b53ade95ea316fd8c3286feb9";
const PUBKEY_HASH_HEX: &str = "1d0f172a0ecb48aee1be1f2687d2963ae33f71a1";
const EXPECTED_SIGHASH_HEX: &str = "c37af31116d1b27caf68aae9e3ac82f1477929014d5b917657d0eb49478cb670";
const EXPECTED_SIGNATURE_HEX: &str = "304402203609e17b84f6a7d30c80bfa610b5b4542f32a8a0d5447a12fb1366d7f01cc44a0220573a954c4518331561406f90300e8f3358f51928d43c212a8caed02de67eebee01";
const SECOND_INPUT_VALUE: u64 = 600_000_000;

fn bytes32(hex_str: &str) -> [u8; 32] {
    hex::decode(hex_str).unwrap().try_into().unwrap()
}

fn p2pkh(hash_hex: &str) -> Vec<u8> {
    hex::decode(format!("76a914{hash_hex}88ac")).unwrap()
}

fn vector_skeleton() -> TxSkeleton {
    TxSkeleton {
        version: 1,
        inputs: vec![
            TxInput {
                prev_txid: bytes32(
                    "fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f",
                ),
                prev_vout: 0,
                sequence: 0xFFFF_FFEE,
                value_sat: 625_000_000,
            },
            TxInput {
                prev_txid: bytes32(
                    "ef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a",
                ),
                prev_vout: 1,
                sequence: 0xFFFF_FFFF,
                value_sat: SECOND_INPUT_VALUE,
            },
        ],
        outputs: vec![
            TxOutput {
                value_sat: 112_340_000,
                script_pubkey: p2pkh("8280b37df378db99f66f85c95a783a76ac7a6d59"),
            },
            TxOutput {
                value_sat: 223_450_000,
                script_pubkey: p2pkh("3bde42dbee7e4dbe6a21b2d50ce2f0167faa8159"),
            },
        ],
        lock_time: 0x11,
    }
}

fn script_code() -> Vec<u8> {
    let hash: [u8; 20] = hex::decode(PUBKEY_HASH_HEX).unwrap().try_into().unwrap();
    p2wpkh_script_code(&hash)
}

#[test]
fn skeleton_serializes_to_published_unsigned_tx() {
    assert_eq!(
        hex::encode(vector_skeleton().serialize_without_witness()),
        UNSIGNED_TX_HEX
    );
}

#[test]
fn script_code_matches_published_value() {
    assert_eq!(
        hex::encode(script_code()),
        "1976a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac"
    );
}

#[test]
fn sighash_matches_published_value() {
    let sighash =
        compute_bip143_sighash(&vector_skeleton(), 1, &script_code(), SECOND_INPUT_VALUE).unwrap();
    assert_eq!(hex::encode(sighash), EXPECTED_SIGHASH_HEX);
}

#[test]
fn signature_matches_published_value() {
    let key = bytes32(PRIVATE_KEY_HEX);
    let signature = sign_input(&vector_skeleton(), 1, &key).unwrap();
    assert_eq!(hex::encode(signature), EXPECTED_SIGNATURE_HEX);
}

#[test]
fn bitcoin_crate_agrees_on_sighash() {
    use bitcoin::hashes::Hash;
    use bitcoin::sighash::{EcdsaSighashType, SighashCache};
    use bitcoin::{Amount, ScriptBuf, Transaction};

    let tx: Transaction =
        bitcoin::consensus::deserialize(&hex::decode(UNSIGNED_TX_HEX).unwrap()).unwrap();
    let spk = ScriptBuf::from_bytes(hex::decode(format!("0014{PUBKEY_HASH_HEX}")).unwrap());

    let mut cache = SighashCache::new(&tx);
    let expected = cache
        .p2wpkh_signature_hash(
            1,
            &spk,
            Amount::from_sat(SECOND_INPUT_VALUE),
            EcdsaSighashType::All,
        )
        .unwrap();

    let ours =
        compute_bip143_sighash(&vector_skeleton(), 1, &script_code(), SECOND_INPUT_VALUE).unwrap();
    assert_eq!(ours, expected.to_byte_array());
}
