use bip32::{DerivationPath, XPrv};
use crypto_utils::hash160;
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

use crate::error::WalletError;
use crate::mnemonic::mnemonic_to_seed;

/// Parse a BIP-32 path such as `m/84'/2'/0'/0/0`. `h` is accepted for
/// hardened components as well as `'`.
pub fn parse_path(path: &str) -> Result<DerivationPath, WalletError> {
    let trimmed = path.trim();
    if !trimmed.starts_with('m') {
        return Err(WalletError::DerivationFailed(format!(
            "path must start with m: {trimmed}"
        )));
    }
    let canonical = trimmed
        .split('/')
        .map(|component| match component.strip_suffix(|c| c == 'h' || c == 'H') {
            Some(index) => format!("{index}'"),
            None => component.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");
    canonical
        .parse::<DerivationPath>()
        .map_err(|e: bip32::Error| WalletError::DerivationFailed(format!("{trimmed}: {e}")))
}

/// Derive the key at `path` from a mnemonic with an empty passphrase.
///
/// The key is never stored; callers derive it again whenever they sign.
pub fn derive_key(phrase: &str, path: &str) -> Result<DerivedKey, WalletError> {
    let seed = mnemonic_to_seed(phrase, "").map_err(|e| match e {
        WalletError::InvalidMnemonic(reason) => {
            WalletError::DerivationFailed(format!("invalid mnemonic: {reason}"))
        }
        other => other,
    })?;
    derive_key_from_seed(seed.as_slice(), path)
}

/// Derive a secp256k1 key from seed bytes using BIP-32
pub fn derive_key_from_seed(seed: &[u8], path: &str) -> Result<DerivedKey, WalletError> {
    let derivation_path = parse_path(path)?;

    let xprv = XPrv::derive_from_path(seed, &derivation_path)?;

    let mut private_key: [u8; 32] = xprv.to_bytes().into();
    let signing_key = match SigningKey::from_bytes(&private_key.into()) {
        Ok(key) => key,
        Err(e) => {
            private_key.zeroize();
            return Err(WalletError::DerivationFailed(e.to_string()));
        }
    };

    let public_key: [u8; 33] = match signing_key.verifying_key().to_sec1_bytes().as_ref().try_into() {
        Ok(bytes) => bytes,
        Err(_) => {
            private_key.zeroize();
            return Err(WalletError::DerivationFailed(
                "unexpected public key length".into(),
            ));
        }
    };

    Ok(DerivedKey {
        private_key,
        public_key,
        derivation_path: derivation_path.to_string(),
    })
}

/// A secp256k1 key pair scoped to one signing operation. The private half
/// is zeroed on drop.
pub struct DerivedKey {
    pub private_key: [u8; 32],
    /// SEC1 compressed.
    pub public_key: [u8; 33],
    pub derivation_path: String,
}

impl DerivedKey {
    /// HASH160 of the compressed public key, the P2WPKH witness program.
    pub fn pubkey_hash(&self) -> [u8; 20] {
        hash160(&self.public_key)
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("public_key", &hex::encode(self.public_key))
            .field("derivation_path", &self.derivation_path)
            .finish_non_exhaustive()
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}
