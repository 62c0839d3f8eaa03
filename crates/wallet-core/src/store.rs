use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::error::WalletError;
use crate::mnemonic::validate_mnemonic;
use crate::types::WalletIdentity;

/// On-disk shape: `{"mnemonic": ..., "addresses": {...}, "createdAt": ms}`.
/// Unknown fields are ignored; there is no schema version.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWallet {
    mnemonic: String,
    addresses: BTreeMap<String, String>,
    created_at: i64,
}

impl Drop for StoredWallet {
    fn drop(&mut self) {
        self.mnemonic.zeroize();
    }
}

/// A single JSON file holding the wallet identity between runs.
#[derive(Debug, Clone)]
pub struct WalletStore {
    path: PathBuf,
}

impl WalletStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no wallet has been saved.
    pub async fn load(&self) -> Result<Option<WalletIdentity>, WalletError> {
        let mut bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored wallet");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };
        let parsed = serde_json::from_slice::<StoredWallet>(&bytes);
        bytes.zeroize();
        let stored = parsed?;

        if !validate_mnemonic(&stored.mnemonic) {
            return Err(WalletError::Store(format!(
                "{}: stored mnemonic is not valid",
                self.path.display()
            )));
        }

        Ok(Some(WalletIdentity::new(
            stored.mnemonic.clone(),
            stored.addresses.clone(),
            stored.created_at,
        )))
    }

    pub async fn save(&self, identity: &WalletIdentity) -> Result<(), WalletError> {
        let stored = StoredWallet {
            mnemonic: identity.seed_phrase().to_string(),
            addresses: identity.addresses().clone(),
            created_at: identity.created_at(),
        };
        let mut json = serde_json::to_vec_pretty(&stored)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let written = tokio::fs::write(&self.path, &json).await;
        json.zeroize();
        written.map_err(|e| self.io_error(e))?;

        info!(path = %self.path.display(), "wallet saved");
        Ok(())
    }

    /// Remove the file. A missing file is not an error.
    pub async fn delete(&self) -> Result<(), WalletError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "wallet store deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, e: std::io::Error) -> WalletError {
        WalletError::Store(format!("{}: {e}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn identity() -> WalletIdentity {
        let mut addresses = BTreeMap::new();
        addresses.insert(
            "ltc".to_string(),
            "ltc1qjmxnz78nmc8nq77wuxh25n2es7rzm5c2rkk4wh".to_string(),
        );
        WalletIdentity::new(TEST_MNEMONIC.into(), addresses, 1_700_000_000_000)
    }

    #[tokio::test]
    async fn save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("nested").join("wallet.json"));

        assert!(store.load().await.unwrap().is_none());

        store.save(&identity()).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.seed_phrase(), TEST_MNEMONIC);
        assert_eq!(loaded.addresses(), identity().addresses());
        assert_eq!(loaded.created_at(), 1_700_000_000_000);

        store.delete().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.delete().await.unwrap();
    }

    #[tokio::test]
    async fn file_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallet.json"));
        store.save(&identity()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["mnemonic"], TEST_MNEMONIC);
        assert_eq!(raw["createdAt"], 1_700_000_000_000i64);
        assert_eq!(
            raw["addresses"]["ltc"],
            "ltc1qjmxnz78nmc8nq77wuxh25n2es7rzm5c2rkk4wh"
        );
    }

    #[tokio::test]
    async fn unknown_fields_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let json = serde_json::json!({
            "mnemonic": TEST_MNEMONIC,
            "addresses": {"ltc": "ltc1qx"},
            "createdAt": 5,
            "twoFactor": {"enabled": false}
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let loaded = WalletStore::new(&path).load().await.unwrap().unwrap();
        assert_eq!(loaded.created_at(), 5);
    }

    #[tokio::test]
    async fn corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            WalletStore::new(&path).load().await,
            Err(WalletError::Store(_))
        ));

        let bad_phrase = serde_json::json!({
            "mnemonic": "not a phrase",
            "addresses": {},
            "createdAt": 0
        });
        std::fs::write(&path, bad_phrase.to_string()).unwrap();
        assert!(WalletStore::new(&path).load().await.is_err());
    }
}
