use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::WalletError;

/// Phrase lengths offered at wallet creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordCount {
    #[default]
    Twelve,
    TwentyFour,
}

impl WordCount {
    /// 12 words = 128 bits, 24 words = 256 bits of entropy.
    pub fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::TwentyFour => 32,
        }
    }

    pub fn words(self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::TwentyFour => 24,
        }
    }
}

impl TryFrom<usize> for WordCount {
    type Error = WalletError;

    fn try_from(words: usize) -> Result<Self, Self::Error> {
        match words {
            12 => Ok(WordCount::Twelve),
            24 => Ok(WordCount::TwentyFour),
            n => Err(WalletError::InvalidMnemonic(format!(
                "expected 12 or 24 words, got {n}"
            ))),
        }
    }
}

/// Generate a fresh BIP-39 phrase from OS randomness.
pub fn generate_mnemonic(words: WordCount) -> Result<Zeroizing<String>, WalletError> {
    let mut entropy = [0u8; 32];
    let entropy_len = words.entropy_bytes();
    rand::rngs::OsRng.fill_bytes(&mut entropy[..entropy_len]);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..entropy_len])
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();
    Ok(Zeroizing::new(mnemonic?.to_string()))
}

/// Lower-case, trim and collapse runs of whitespace to single spaces.
pub fn normalize_phrase(phrase: &str) -> Zeroizing<String> {
    Zeroizing::new(
        phrase
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Parse a 12- or 24-word English phrase, checking words and checksum.
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, WalletError> {
    let normalized = normalize_phrase(phrase);
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    WordCount::try_from(mnemonic.word_count())?;
    Ok(mnemonic)
}

/// Wordlist membership plus checksum. Never fails.
pub fn validate_mnemonic(phrase: &str) -> bool {
    parse_mnemonic(phrase).is_ok()
}

/// 64-byte BIP-39 seed. Zeroed when the returned buffer drops.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Zeroizing<[u8; 64]>, WalletError> {
    let mnemonic = parse_mnemonic(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed(passphrase)))
}

/// Get the word list for autocomplete
pub fn word_list() -> &'static [&'static str] {
    Language::English.word_list()
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}

/// Completions for a partially typed word.
pub fn words_with_prefix(prefix: &str) -> Vec<&'static str> {
    if prefix.is_empty() {
        return Vec::new();
    }
    Language::English.words_by_prefix(prefix).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_mnemonic_word_counts() {
        let twelve = generate_mnemonic(WordCount::Twelve).unwrap();
        assert_eq!(twelve.split_whitespace().count(), 12);
        let twenty_four = generate_mnemonic(WordCount::TwentyFour).unwrap();
        assert_eq!(twenty_four.split_whitespace().count(), 24);
    }

    #[test]
    fn test_generated_mnemonic_validates() {
        let phrase = generate_mnemonic(WordCount::Twelve).unwrap();
        assert!(validate_mnemonic(&phrase));
    }

    #[test]
    fn test_generated_mnemonics_differ() {
        let a = generate_mnemonic(WordCount::Twelve).unwrap();
        let b = generate_mnemonic(WordCount::Twelve).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_validate_invalid_mnemonic() {
        assert!(!validate_mnemonic("invalid mnemonic phrase here"));
        assert!(!validate_mnemonic(""));
        // Valid words, wrong checksum.
        assert!(!validate_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
        ));
    }

    #[test]
    fn test_other_word_counts_rejected() {
        // 15 words with a valid checksum are still not offered.
        let fifteen = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon address";
        assert!(!validate_mnemonic(fifteen));
        assert!(WordCount::try_from(15).is_err());
    }

    #[test]
    fn test_validate_tolerates_spacing_and_case() {
        let messy = format!("  {}  ", ABANDON_ABOUT.to_uppercase().replace(' ', "   "));
        assert!(validate_mnemonic(&messy));
        assert_eq!(normalize_phrase(&messy).as_str(), ABANDON_ABOUT);
    }

    #[test]
    fn test_bip39_test_vector() {
        let seed = mnemonic_to_seed(ABANDON_ABOUT, "").unwrap();
        assert_eq!(
            hex::encode(seed.as_slice()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let plain = mnemonic_to_seed(ABANDON_ABOUT, "").unwrap();
        let salted = mnemonic_to_seed(ABANDON_ABOUT, "TREZOR").unwrap();
        assert_ne!(*plain, *salted);
    }

    #[test]
    fn test_is_valid_word() {
        assert!(is_valid_word("abandon"));
        assert!(is_valid_word("zoo"));
        assert!(!is_valid_word("notaword"));
        assert!(!is_valid_word(""));
        assert_eq!(word_list().len(), 2048);
    }

    #[test]
    fn test_words_with_prefix() {
        let words = words_with_prefix("aban");
        assert_eq!(words, vec!["abandon"]);
        assert!(words_with_prefix("").is_empty());
        assert!(words_with_prefix("qqq").is_empty());
    }
}
