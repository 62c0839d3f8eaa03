use thiserror::Error;

/// Address codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid character: {0:?}")]
    InvalidCharacter(char),

    #[error("invalid checksum")]
    InvalidChecksum,

    #[error("invalid length: {0}")]
    InvalidLength(String),

    #[error("unsupported witness program length: {0} bytes")]
    UnsupportedWitnessLength(usize),

    #[error("unsupported witness version: {0}")]
    UnsupportedWitnessVersion(u8),

    #[error("mixed-case bech32 string")]
    MixedCase,

    #[error("invalid human-readable part: {0}")]
    InvalidHrp(String),

    #[error("invalid padding in bit group conversion")]
    InvalidPadding,

    #[error("value out of range for {0}-bit group")]
    InvalidGroupValue(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_character() {
        let err = CodecError::InvalidCharacter('0');
        assert_eq!(err.to_string(), "invalid character: '0'");
    }

    #[test]
    fn display_invalid_checksum() {
        assert_eq!(CodecError::InvalidChecksum.to_string(), "invalid checksum");
    }

    #[test]
    fn display_unsupported_witness_length() {
        let err = CodecError::UnsupportedWitnessLength(21);
        assert_eq!(
            err.to_string(),
            "unsupported witness program length: 21 bytes"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CodecError::InvalidPadding);
        assert!(err.to_string().contains("padding"));
    }
}
