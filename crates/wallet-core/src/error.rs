use chain_data::AggregatedError;
use chain_utxo::error::UtxoError;
use crypto_utils::CodecError;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported coin: {0}")]
    UnsupportedCoin(String),

    #[error(transparent)]
    Transaction(UtxoError),

    /// Every provider of a capability the operation could not do without failed.
    #[error(transparent)]
    Providers(AggregatedError),

    #[error("no wallet loaded")]
    NoWallet,

    #[error("a wallet is already loaded; log out first")]
    WalletAlreadyLoaded,

    #[error("wallet store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),
}

impl WalletError {
    /// Local failures the caller must fix; retrying will not help.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WalletError::InvalidMnemonic(_)
                | WalletError::InvalidAddress(_)
                | WalletError::Transaction(UtxoError::InvalidAddress(_))
                | WalletError::Transaction(UtxoError::UnsupportedAddressFormat(_))
                | WalletError::Transaction(UtxoError::InsufficientFunds { .. })
        )
    }
}

impl From<UtxoError> for WalletError {
    fn from(e: UtxoError) -> Self {
        WalletError::Transaction(e)
    }
}

impl From<AggregatedError> for WalletError {
    fn from(e: AggregatedError) -> Self {
        WalletError::Providers(e)
    }
}

impl From<CodecError> for WalletError {
    fn from(e: CodecError) -> Self {
        WalletError::InvalidAddress(e.to_string())
    }
}

impl From<bip32::Error> for WalletError {
    fn from(e: bip32::Error) -> Self {
        WalletError::DerivationFailed(e.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::Store(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_passes_through() {
        let err: WalletError = UtxoError::InsufficientFunds {
            needed: 10_000,
            available: 500,
        }
        .into();
        assert_eq!(err.to_string(), UtxoError::InsufficientFunds {
            needed: 10_000,
            available: 500,
        }
        .to_string());
        assert!(err.is_validation());
    }

    #[test]
    fn provider_exhaustion_is_not_validation() {
        let mut agg = AggregatedError::new("utxo");
        agg.push("Esplora", chain_data::ProviderError::Http { status: 502 });
        let err: WalletError = agg.into();
        assert_eq!(
            err.to_string(),
            "all utxo providers failed: Esplora: HTTP 502"
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn display_messages() {
        assert_eq!(WalletError::NoWallet.to_string(), "no wallet loaded");
        assert_eq!(
            WalletError::InvalidMnemonic("bad checksum".into()).to_string(),
            "invalid mnemonic: bad checksum"
        );
    }
}
