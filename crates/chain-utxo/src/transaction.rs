use k256::ecdsa::{signature::hazmat::PrehashSigner, Signature, SigningKey};

use crypto_utils::{hash160, sha256d};

use crate::address::address_to_script;
use crate::der::der_encode_signature;
use crate::error::UtxoError;
use crate::network::UtxoNetwork;
use crate::sighash::{compute_bip143_sighash, p2wpkh_script_code};
use crate::utxo::{select_utxos, total_value, Utxo};

/// Change at or below this many satoshis is left to the miner.
pub const DUST_THRESHOLD_SATS: u64 = 546;

/// Transaction version written by the builder.
pub const TX_VERSION: u32 = 2;

/// Final sequence: no relative lock-time, no RBF signalling.
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// SIGHASH_ALL, appended to every DER signature.
pub const SIGHASH_ALL: u8 = 0x01;

/// Tunables for transaction construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxPolicy {
    pub dust_threshold_sats: u64,
}

impl Default for TxPolicy {
    fn default() -> Self {
        Self {
            dust_threshold_sats: DUST_THRESHOLD_SATS,
        }
    }
}

/// A selected spend, ready to be turned into a skeleton and signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTxPlan {
    pub selected_utxos: Vec<Utxo>,
    pub recipient_script: Vec<u8>,
    pub change_script: Vec<u8>,
    pub amount_sat: u64,
    pub fee_sat: u64,
    /// Change value; zero when the remainder was dust.
    pub change_sat: u64,
}

impl UnsignedTxPlan {
    pub fn total_in(&self) -> u64 {
        total_value(&self.selected_utxos)
    }

    /// Fee actually paid, including any dust folded into it.
    pub fn effective_fee(&self) -> u64 {
        self.total_in() - self.amount_sat - self.change_sat
    }

    pub fn has_change(&self) -> bool {
        self.change_sat > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    /// Previous transaction hash (32 bytes, internal byte order).
    pub prev_txid: [u8; 32],
    pub prev_vout: u32,
    pub sequence: u32,
    /// Value of the output being spent (needed for the sighash).
    pub value_sat: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub value_sat: u64,
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    pub(crate) fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.value_sat.to_le_bytes());
        write_compact_size(buf, self.script_pubkey.len() as u64);
        buf.extend_from_slice(&self.script_pubkey);
    }
}

/// Unsigned transaction fields, in serialization order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSkeleton {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl TxSkeleton {
    /// Lay out a plan as version 2, final sequences, lock time 0, with the
    /// recipient output first and change (if any) second.
    pub fn from_plan(plan: &UnsignedTxPlan) -> Result<Self, UtxoError> {
        let inputs = plan
            .selected_utxos
            .iter()
            .map(|utxo| {
                Ok(TxInput {
                    prev_txid: parse_txid(&utxo.txid)?,
                    prev_vout: utxo.vout,
                    sequence: SEQUENCE_FINAL,
                    value_sat: utxo.value_sat,
                })
            })
            .collect::<Result<Vec<_>, UtxoError>>()?;

        let mut outputs = vec![TxOutput {
            value_sat: plan.amount_sat,
            script_pubkey: plan.recipient_script.clone(),
        }];
        if plan.has_change() {
            outputs.push(TxOutput {
                value_sat: plan.change_sat,
                script_pubkey: plan.change_script.clone(),
            });
        }

        Ok(Self {
            version: TX_VERSION,
            inputs,
            outputs,
            lock_time: 0,
        })
    }

    /// Legacy serialization with empty scriptSigs and no witness. This is the
    /// byte string hashed for the txid.
    pub fn serialize_without_witness(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10 + self.inputs.len() * 41 + self.outputs.len() * 34);
        buf.extend_from_slice(&self.version.to_le_bytes());
        self.write_inputs_and_outputs(&mut buf);
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// Transaction id in display (byte-reversed) hex.
    pub fn txid(&self) -> String {
        display_hash(&sha256d(&self.serialize_without_witness()))
    }

    fn write_inputs_and_outputs(&self, buf: &mut Vec<u8>) {
        write_compact_size(buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.extend_from_slice(&input.prev_txid);
            buf.extend_from_slice(&input.prev_vout.to_le_bytes());
            buf.push(0x00); // empty scriptSig
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_compact_size(buf, self.outputs.len() as u64);
        for output in &self.outputs {
            output.write_to(buf);
        }
    }
}

/// A fully signed SegWit transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    bytes: Vec<u8>,
    txid: String,
}

impl SignedTransaction {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Lowercase hex, as accepted by broadcast endpoints.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Transaction id (witness data excluded).
    pub fn txid(&self) -> &str {
        &self.txid
    }
}

/// Select UTXOs for a payment and decide on change.
///
/// Change is `total_in - amount - fee`; when it does not exceed the policy's
/// dust threshold it is dropped and the plan carries a single output.
pub fn plan_transaction(
    utxos: &[Utxo],
    recipient_address: &str,
    change_address: &str,
    amount_sat: u64,
    fee_sat: u64,
    network: UtxoNetwork,
    policy: TxPolicy,
) -> Result<UnsignedTxPlan, UtxoError> {
    if amount_sat == 0 {
        return Err(UtxoError::TransactionBuildError(
            "amount must be greater than zero".into(),
        ));
    }

    let recipient_script = address_to_script(recipient_address, network)?;
    let change_script = address_to_script(change_address, network)?;

    let selected_utxos = select_utxos(utxos, amount_sat, fee_sat)?;
    let total_in = total_value(&selected_utxos);
    let remainder = total_in - amount_sat - fee_sat;
    let change_sat = if remainder > policy.dust_threshold_sats {
        remainder
    } else {
        0
    };

    Ok(UnsignedTxPlan {
        selected_utxos,
        recipient_script,
        change_script,
        amount_sat,
        fee_sat,
        change_sat,
    })
}

/// Sign every input of a plan with one key and serialize the result.
///
/// All inputs are assumed to be P2WPKH outputs locked to `private_key`.
pub fn sign_and_assemble(
    plan: &UnsignedTxPlan,
    private_key: &[u8; 32],
) -> Result<SignedTransaction, UtxoError> {
    let skeleton = TxSkeleton::from_plan(plan)?;
    sign_skeleton(&skeleton, private_key)
}

/// Sign every input of a skeleton with one key and serialize with witnesses.
pub fn sign_skeleton(
    skeleton: &TxSkeleton,
    private_key: &[u8; 32],
) -> Result<SignedTransaction, UtxoError> {
    if skeleton.inputs.is_empty() {
        return Err(UtxoError::TransactionBuildError("no inputs to sign".into()));
    }

    let signer = InputSigner::new(private_key)?;
    let witnesses = (0..skeleton.inputs.len())
        .map(|index| signer.sign_input(skeleton, index))
        .collect::<Result<Vec<_>, UtxoError>>()?;

    let mut buf = Vec::with_capacity(256);
    buf.extend_from_slice(&skeleton.version.to_le_bytes());
    buf.push(0x00); // segwit marker
    buf.push(0x01); // segwit flag
    skeleton.write_inputs_and_outputs(&mut buf);

    for signature in &witnesses {
        write_compact_size(&mut buf, 2);
        write_compact_size(&mut buf, signature.len() as u64);
        buf.extend_from_slice(signature);
        write_compact_size(&mut buf, signer.public_key.len() as u64);
        buf.extend_from_slice(&signer.public_key);
    }
    buf.extend_from_slice(&skeleton.lock_time.to_le_bytes());

    Ok(SignedTransaction {
        bytes: buf,
        txid: skeleton.txid(),
    })
}

/// Produce the DER signature plus SIGHASH_ALL byte for one P2WPKH input.
pub fn sign_input(
    skeleton: &TxSkeleton,
    input_index: usize,
    private_key: &[u8; 32],
) -> Result<Vec<u8>, UtxoError> {
    InputSigner::new(private_key)?.sign_input(skeleton, input_index)
}

struct InputSigner {
    signing_key: SigningKey,
    public_key: [u8; 33],
    script_code: Vec<u8>,
}

impl InputSigner {
    fn new(private_key: &[u8; 32]) -> Result<Self, UtxoError> {
        let signing_key = SigningKey::from_bytes(private_key.into())
            .map_err(|e| UtxoError::InvalidPrivateKey(format!("invalid secp256k1 key: {e}")))?;

        let public_key: [u8; 33] = signing_key
            .verifying_key()
            .to_sec1_bytes()
            .as_ref()
            .try_into()
            .map_err(|_| UtxoError::SigningError("invalid public key".into()))?;
        let script_code = p2wpkh_script_code(&hash160(&public_key));

        Ok(Self {
            signing_key,
            public_key,
            script_code,
        })
    }

    fn sign_input(&self, skeleton: &TxSkeleton, input_index: usize) -> Result<Vec<u8>, UtxoError> {
        let input = skeleton.inputs.get(input_index).ok_or_else(|| {
            UtxoError::SigningError(format!("input index {input_index} out of bounds"))
        })?;
        let sighash =
            compute_bip143_sighash(skeleton, input_index, &self.script_code, input.value_sat)?;

        let sig: Signature = self
            .signing_key
            .sign_prehash(&sighash)
            .map_err(|e| UtxoError::SigningError(format!("ECDSA signing failed: {e}")))?;
        let sig = sig.normalize_s().unwrap_or(sig);

        let (r_bytes, s_bytes) = sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);

        let mut out = der_encode_signature(&r, &s);
        out.push(SIGHASH_ALL);
        Ok(out)
    }
}

/// Parse a hex txid string (big-endian display) to internal byte order.
pub fn parse_txid(txid_hex: &str) -> Result<[u8; 32], UtxoError> {
    let bytes = hex::decode(txid_hex)
        .map_err(|e| UtxoError::TransactionBuildError(format!("invalid txid hex: {e}")))?;
    let mut result: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
        UtxoError::TransactionBuildError(format!("txid must be 32 bytes, got {}", b.len()))
    })?;
    result.reverse();
    Ok(result)
}

fn display_hash(hash: &[u8; 32]) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Write a Bitcoin-style CompactSize (variable-length integer).
pub(crate) fn write_compact_size(buf: &mut Vec<u8>, val: u64) {
    if val < 0xFD {
        buf.push(val as u8);
    } else if val <= 0xFFFF {
        buf.push(0xFD);
        buf.extend_from_slice(&(val as u16).to_le_bytes());
    } else if val <= 0xFFFF_FFFF {
        buf.push(0xFE);
        buf.extend_from_slice(&(val as u32).to_le_bytes());
    } else {
        buf.push(0xFF);
        buf.extend_from_slice(&val.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{signature::hazmat::PrehashVerifier, VerifyingKey};

    // m/84'/2'/0'/0/0 for "abandon ... about".
    const TEST_PRIVKEY_HEX: &str =
        "4ab54480cbbaa53d5d3ba43a3e85d221df085490e88346ad11579e17000db7bb";
    const OWN_ADDRESS: &str = "ltc1qjmxnz78nmc8nq77wuxh25n2es7rzm5c2rkk4wh";
    const RECIPIENT: &str = "ltc1qw508d6qejxtdg4y5r3zarvary0c5xw7kgmn4n9";

    fn test_key() -> [u8; 32] {
        hex::decode(TEST_PRIVKEY_HEX).unwrap().try_into().unwrap()
    }

    fn utxo(tag: u8, vout: u32, value_sat: u64) -> Utxo {
        Utxo {
            txid: format!("{:02x}", tag).repeat(32),
            vout,
            value_sat,
        }
    }

    fn plan(utxos: &[Utxo], amount: u64, fee: u64) -> UnsignedTxPlan {
        plan_transaction(
            utxos,
            RECIPIENT,
            OWN_ADDRESS,
            amount,
            fee,
            UtxoNetwork::LitecoinMainnet,
            TxPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn plan_with_change() {
        let p = plan(&[utxo(1, 0, 100_000)], 50_000, 2_500);
        assert_eq!(p.change_sat, 47_500);
        assert_eq!(p.effective_fee(), 2_500);
        assert_eq!(
            p.change_script,
            address_to_script(OWN_ADDRESS, UtxoNetwork::LitecoinMainnet).unwrap()
        );
    }

    #[test]
    fn dust_change_is_dropped() {
        let p = plan(&[utxo(1, 0, 53_000)], 50_000, 2_500);
        assert!(!p.has_change());
        assert_eq!(p.effective_fee(), 3_000);

        let skeleton = TxSkeleton::from_plan(&p).unwrap();
        assert_eq!(skeleton.outputs.len(), 1);
        assert_eq!(skeleton.outputs[0].value_sat, 50_000);
    }

    #[test]
    fn change_exactly_at_dust_threshold_is_dropped() {
        let p = plan(&[utxo(1, 0, 50_000 + 2_500 + 546)], 50_000, 2_500);
        assert_eq!(p.change_sat, 0);

        let p = plan(&[utxo(1, 0, 50_000 + 2_500 + 547)], 50_000, 2_500);
        assert_eq!(p.change_sat, 547);
    }

    #[test]
    fn custom_dust_policy() {
        let p = plan_transaction(
            &[utxo(1, 0, 60_000)],
            RECIPIENT,
            OWN_ADDRESS,
            50_000,
            2_500,
            UtxoNetwork::LitecoinMainnet,
            TxPolicy {
                dust_threshold_sats: 10_000,
            },
        )
        .unwrap();
        assert!(!p.has_change());
    }

    #[test]
    fn plan_rejects_zero_amount_and_bad_recipient() {
        let utxos = [utxo(1, 0, 100_000)];
        assert!(matches!(
            plan_transaction(
                &utxos,
                RECIPIENT,
                OWN_ADDRESS,
                0,
                1_000,
                UtxoNetwork::LitecoinMainnet,
                TxPolicy::default()
            ),
            Err(UtxoError::TransactionBuildError(_))
        ));
        assert!(matches!(
            plan_transaction(
                &utxos,
                "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
                OWN_ADDRESS,
                10_000,
                1_000,
                UtxoNetwork::LitecoinMainnet,
                TxPolicy::default()
            ),
            Err(UtxoError::UnsupportedAddressFormat(_))
        ));
    }

    #[test]
    fn plan_propagates_insufficient_funds() {
        let err = plan_transaction(
            &[utxo(1, 0, 10_000)],
            RECIPIENT,
            OWN_ADDRESS,
            10_000,
            2_500,
            UtxoNetwork::LitecoinMainnet,
            TxPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            UtxoError::InsufficientFunds {
                needed: 12_500,
                available: 10_000
            }
        );
    }

    #[test]
    fn skeleton_layout() {
        let p = plan(&[utxo(0xaa, 3, 100_000)], 50_000, 2_500);
        let skeleton = TxSkeleton::from_plan(&p).unwrap();
        assert_eq!(skeleton.version, 2);
        assert_eq!(skeleton.lock_time, 0);
        assert_eq!(skeleton.inputs[0].sequence, 0xFFFF_FFFF);
        assert_eq!(skeleton.inputs[0].prev_vout, 3);
        assert_eq!(skeleton.outputs[0].script_pubkey, p.recipient_script);
        assert_eq!(skeleton.outputs[1].script_pubkey, p.change_script);
    }

    #[test]
    fn parse_txid_reverses_bytes() {
        let display = format!("{}{}", "00".repeat(31), "ff");
        let internal = parse_txid(&display).unwrap();
        assert_eq!(internal[0], 0xff);
        assert_eq!(internal[31], 0x00);
        assert!(parse_txid("abcd").is_err());
        assert!(parse_txid("zz").is_err());
    }

    #[test]
    fn signed_transaction_layout() {
        let p = plan(&[utxo(1, 0, 60_000), utxo(2, 1, 70_000)], 100_000, 2_500);
        assert_eq!(p.selected_utxos.len(), 2);
        let signed = sign_and_assemble(&p, &test_key()).unwrap();
        let bytes = signed.as_bytes();

        assert_eq!(&bytes[..4], &2u32.to_le_bytes());
        assert_eq!(&bytes[4..6], &[0x00, 0x01]);
        assert_eq!(bytes[6], 2); // input count
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 0]);
        assert_eq!(signed.to_hex(), hex::encode(bytes));
    }

    #[test]
    fn txid_ignores_witness() {
        let p = plan(&[utxo(1, 0, 100_000)], 50_000, 2_500);
        let skeleton = TxSkeleton::from_plan(&p).unwrap();
        let signed = sign_and_assemble(&p, &test_key()).unwrap();
        assert_eq!(signed.txid(), skeleton.txid());
        assert_eq!(signed.txid().len(), 64);
    }

    #[test]
    fn signing_is_deterministic() {
        let p = plan(&[utxo(1, 0, 100_000)], 50_000, 2_500);
        let a = sign_and_assemble(&p, &test_key()).unwrap();
        let b = sign_and_assemble(&p, &test_key()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn signatures_verify_and_are_low_s() {
        let p = plan(&[utxo(1, 0, 60_000), utxo(2, 1, 70_000)], 100_000, 2_500);
        let skeleton = TxSkeleton::from_plan(&p).unwrap();
        let key = test_key();
        let signing_key = SigningKey::from_bytes((&key).into()).unwrap();
        let verifying_key = VerifyingKey::from(&signing_key);
        let script_code = p2wpkh_script_code(&hash160(&verifying_key.to_sec1_bytes()));

        for (index, input) in skeleton.inputs.iter().enumerate() {
            let sig_bytes = sign_input(&skeleton, index, &key).unwrap();
            assert_eq!(*sig_bytes.last().unwrap(), SIGHASH_ALL);

            let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1]).unwrap();
            assert!(sig.normalize_s().is_none(), "signature must be low-S");

            let sighash =
                compute_bip143_sighash(&skeleton, index, &script_code, input.value_sat).unwrap();
            verifying_key.verify_prehash(&sighash, &sig).unwrap();
        }
    }

    #[test]
    fn der_matches_k256_encoding() {
        let p = plan(&[utxo(1, 0, 100_000)], 50_000, 2_500);
        let skeleton = TxSkeleton::from_plan(&p).unwrap();
        let sig_bytes = sign_input(&skeleton, 0, &test_key()).unwrap();
        let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1]).unwrap();
        assert_eq!(sig.to_der().as_bytes(), &sig_bytes[..sig_bytes.len() - 1]);
    }

    #[test]
    fn sign_rejects_bad_key_and_index() {
        let p = plan(&[utxo(1, 0, 100_000)], 50_000, 2_500);
        assert!(matches!(
            sign_and_assemble(&p, &[0u8; 32]),
            Err(UtxoError::InvalidPrivateKey(_))
        ));

        let skeleton = TxSkeleton::from_plan(&p).unwrap();
        assert!(matches!(
            sign_input(&skeleton, 5, &test_key()),
            Err(UtxoError::SigningError(_))
        ));
    }

    #[test]
    fn compact_size_boundaries() {
        let cases: [(u64, &[u8]); 5] = [
            (0, &[0x00]),
            (0xFC, &[0xFC]),
            (0xFD, &[0xFD, 0xFD, 0x00]),
            (0x1_0000, &[0xFE, 0x00, 0x00, 0x01, 0x00]),
            (0x1_0000_0000, &[0xFF, 0, 0, 0, 0, 1, 0, 0, 0]),
        ];
        for (val, expected) in cases {
            let mut buf = Vec::new();
            write_compact_size(&mut buf, val);
            assert_eq!(buf, expected, "compact size of {val}");
        }
    }
}
