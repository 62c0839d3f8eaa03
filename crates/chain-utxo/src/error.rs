use thiserror::Error;

/// UTXO chain operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UtxoError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported address format: {0}")]
    UnsupportedAddressFormat(String),

    #[error("insufficient funds: need {needed} sat, have {available} sat")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = UtxoError::InvalidAddress("bad checksum".into());
        assert_eq!(err.to_string(), "invalid address: bad checksum");
    }

    #[test]
    fn display_unsupported_address_format() {
        let err = UtxoError::UnsupportedAddressFormat("version byte 0x1e".into());
        assert_eq!(
            err.to_string(),
            "unsupported address format: version byte 0x1e"
        );
    }

    #[test]
    fn display_insufficient_funds() {
        let err = UtxoError::InsufficientFunds {
            needed: 100_000,
            available: 50_000,
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: need 100000 sat, have 50000 sat"
        );
    }

    #[test]
    fn display_signing_error() {
        let err = UtxoError::SigningError("sighash failed".into());
        assert_eq!(err.to_string(), "signing error: sighash failed");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(UtxoError::InvalidPrivateKey("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
