use crypto_utils::{base58check_decode, base58check_encode, bech32_decode, bech32_encode, hash160};
use crypto_utils::CodecError;

use crate::error::UtxoError;
use crate::network::UtxoNetwork;

/// Address encodings a single compressed public key can be shown as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Native SegWit v0, bech32 (`ltc1q...`, `bc1q...`).
    P2wpkh,
    /// Legacy pay-to-pubkey-hash, Base58Check (`L...`, `1...`).
    P2pkh,
    /// SegWit nested in P2SH, Base58Check (`M...`, `3...`).
    P2shP2wpkh,
}

/// Output script types a recipient address can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    P2wpkh,
    P2wsh,
    P2pkh,
    P2sh,
}

/// Encode a compressed public key as an address of the given kind.
pub fn pubkey_to_address(
    public_key: &[u8; 33],
    kind: AddressKind,
    network: UtxoNetwork,
) -> Result<String, UtxoError> {
    if public_key[0] != 0x02 && public_key[0] != 0x03 {
        return Err(UtxoError::InvalidPublicKey(
            "expected compressed public key (0x02 or 0x03 prefix)".into(),
        ));
    }
    let pubkey_hash = hash160(public_key);
    pubkey_hash_to_address(&pubkey_hash, kind, network)
}

/// Encode a HASH160 of a compressed public key as an address of the given kind.
pub fn pubkey_hash_to_address(
    pubkey_hash: &[u8; 20],
    kind: AddressKind,
    network: UtxoNetwork,
) -> Result<String, UtxoError> {
    match kind {
        AddressKind::P2wpkh => bech32_encode(network.bech32_hrp(), 0, pubkey_hash)
            .map_err(|e| UtxoError::InvalidAddress(e.to_string())),
        AddressKind::P2pkh => Ok(base58check_encode(network.p2pkh_version(), pubkey_hash)),
        AddressKind::P2shP2wpkh => {
            let redeem_script = p2wpkh_script(pubkey_hash);
            let script_hash = hash160(&redeem_script);
            Ok(base58check_encode(network.p2sh_version(), &script_hash))
        }
    }
}

/// Resolve a recipient address to the output script it pays.
pub fn address_to_script(address: &str, network: UtxoNetwork) -> Result<Vec<u8>, UtxoError> {
    classify_address(address, network).map(|(_, script)| script)
}

/// Resolve an address to its script kind and scriptPubKey.
///
/// Bech32 addresses must carry the network's hrp and witness version 0;
/// Base58Check addresses must carry one of the network's version bytes.
pub fn classify_address(
    address: &str,
    network: UtxoNetwork,
) -> Result<(ScriptKind, Vec<u8>), UtxoError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(UtxoError::InvalidAddress("empty address".into()));
    }

    let segwit_prefix = format!("{}1", network.bech32_hrp());
    if address.to_ascii_lowercase().starts_with(&segwit_prefix) {
        let witness = bech32_decode(address).map_err(|e| match e {
            CodecError::UnsupportedWitnessVersion(v) => {
                UtxoError::UnsupportedAddressFormat(format!("witness version {v}"))
            }
            other => UtxoError::InvalidAddress(other.to_string()),
        })?;
        return match witness.program.len() {
            20 => Ok((ScriptKind::P2wpkh, witness_v0_script(&witness.program))),
            32 => Ok((ScriptKind::P2wsh, witness_v0_script(&witness.program))),
            n => Err(UtxoError::UnsupportedAddressFormat(format!(
                "witness program of {n} bytes"
            ))),
        };
    }

    match base58check_decode(address) {
        Ok((version, hash)) if version == network.p2pkh_version() => {
            Ok((ScriptKind::P2pkh, p2pkh_script(&hash)))
        }
        Ok((version, hash)) if network.p2sh_versions().contains(&version) => {
            Ok((ScriptKind::P2sh, p2sh_script(&hash)))
        }
        Ok((version, _)) => Err(UtxoError::UnsupportedAddressFormat(format!(
            "version byte 0x{version:02x} on {network}"
        ))),
        Err(CodecError::InvalidChecksum) => {
            Err(UtxoError::InvalidAddress("checksum mismatch".into()))
        }
        Err(_) => match bech32_decode(address) {
            Ok(witness) => Err(UtxoError::UnsupportedAddressFormat(format!(
                "bech32 address for hrp {}, expected {}",
                witness.hrp,
                network.bech32_hrp()
            ))),
            Err(_) => Err(UtxoError::UnsupportedAddressFormat(format!(
                "{address} is not a {network} address"
            ))),
        },
    }
}

/// Whether the address resolves to a payable script on this network.
pub fn validate_address(address: &str, network: UtxoNetwork) -> bool {
    classify_address(address, network).is_ok()
}

/// `OP_0 <20-byte pubkey hash>`
pub fn p2wpkh_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    witness_v0_script(pubkey_hash)
}

/// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
pub fn p2pkh_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.push(0x76); // OP_DUP
    script.push(0xa9); // OP_HASH160
    script.push(0x14);
    script.extend_from_slice(pubkey_hash);
    script.push(0x88); // OP_EQUALVERIFY
    script.push(0xac); // OP_CHECKSIG
    script
}

/// `OP_HASH160 <20-byte script hash> OP_EQUAL`
pub fn p2sh_script(script_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(23);
    script.push(0xa9);
    script.push(0x14);
    script.extend_from_slice(script_hash);
    script.push(0x87); // OP_EQUAL
    script
}

fn witness_v0_script(program: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(2 + program.len());
    script.push(0x00);
    script.push(program.len() as u8);
    script.extend_from_slice(program);
    script
}
