use std::str::FromStr;

pub use self::ed25519::SOLANA_BASE_PATH;
pub use self::secp256k1::ETHEREUM_BASE_PATH;

mod ed25519;
mod secp256k1;

const LANGUAGE: bip39::Language = bip39::Language::English;
const WORD_COUNT: bip39::MnemonicType = bip39::MnemonicType::Words12;

/// Length of a BIP39 binary seed in bytes
pub const SEED_LEN: usize = 64;

/// First hardened child number. Indices at or above it don't fit
/// into a path segment and must be rejected.
const HARDENED_OFFSET: u32 = 0x8000_0000;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Chain {
    /// Ed25519 curve, SLIP-0010 hardened-only derivation
    Solana,
    /// secp256k1 curve, BIP32 derivation
    Ethereum,
}

impl Chain {
    pub fn name(self) -> &'static str {
        match self {
            Self::Solana => "solana",
            Self::Ethereum => "ethereum",
        }
    }

    /// Derivation path used for the account at the given index.
    ///
    /// Must match other wallets byte-for-byte.
    pub fn derivation_path(self, index: u32) -> String {
        match self {
            Self::Solana => format!("{SOLANA_BASE_PATH}/{index}'/0'"),
            Self::Ethereum => format!("{ETHEREUM_BASE_PATH}/{index}'/0/0"),
        }
    }

    /// Derives the keypair for the account at the given index.
    ///
    /// Deterministic for a fixed (seed, index) pair. The caller is expected
    /// to extract the address and drop the secret.
    pub fn derive_key_pair(self, seed: &[u8], index: u32) -> Result<ChainKeyPair, DerivationError> {
        if seed.len() != SEED_LEN {
            return Err(DerivationError::InvalidSeed);
        }
        if index >= HARDENED_OFFSET {
            return Err(DerivationError::IndexOutOfRange);
        }

        match self {
            Self::Solana => ed25519::derive_key_pair(seed, index),
            Self::Ethereum => secp256k1::derive_key_pair(seed, index),
        }
    }
}

impl FromStr for Chain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solana" | "sol" => Ok(Self::Solana),
            "ethereum" | "eth" => Ok(Self::Ethereum),
            _ => Err(anyhow::anyhow!(
                "unknown chain (neither `solana` nor `ethereum`)"
            )),
        }
    }
}

/// Keypair derived for one chain at one index.
///
/// The secret is ephemeral and never stored at rest.
pub struct ChainKeyPair {
    pub secret: [u8; 32],
    /// Chain-native encoded public identifier
    pub address: String,
}

/// Generates a fresh 12 word seed phrase from 128 bits of OS entropy
pub fn generate_phrase() -> String {
    bip39::Mnemonic::new(WORD_COUNT, LANGUAGE).into_phrase()
}

/// Checks word count, wordlist membership and checksum
pub fn validate_phrase(phrase: &str) -> Result<(), MnemonicError> {
    let phrase = phrase.trim();
    if phrase.split_whitespace().count() != 12 {
        return Err(MnemonicError::InvalidWordCount);
    }
    bip39::Mnemonic::from_phrase(phrase, LANGUAGE).map_err(|_| MnemonicError::InvalidPhrase)?;
    Ok(())
}

/// Expands a seed phrase into a binary seed. Pure and deterministic,
/// the same phrase always yields the same bytes.
pub fn phrase_to_seed(phrase: &str) -> Result<[u8; SEED_LEN], MnemonicError> {
    let phrase = phrase.trim();
    if phrase.split_whitespace().count() != 12 {
        return Err(MnemonicError::InvalidWordCount);
    }
    let mnemonic =
        bip39::Mnemonic::from_phrase(phrase, LANGUAGE).map_err(|_| MnemonicError::InvalidPhrase)?;
    let seed = bip39::Seed::new(&mnemonic, "");

    let mut bytes = [0u8; SEED_LEN];
    bytes.copy_from_slice(seed.as_bytes());
    Ok(bytes)
}

#[derive(thiserror::Error, Debug)]
pub enum MnemonicError {
    #[error("expected a 12 word phrase")]
    InvalidWordCount,
    #[error("invalid mnemonic phrase")]
    InvalidPhrase,
}

#[derive(thiserror::Error, Debug)]
pub enum DerivationError {
    #[error("malformed seed length")]
    InvalidSeed,
    #[error("derivation index out of range")]
    IndexOutOfRange,
    #[error("key derivation failed")]
    DerivationFailed,
}

#[cfg(test)]
pub mod tests {
    use super::*;

    // All-zero-entropy BIP39 reference vector
    pub const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon \
         abandon abandon abandon abandon abandon about";

    #[test]
    fn generated_phrase_is_valid() {
        let phrase = generate_phrase();
        assert_eq!(phrase.split_whitespace().count(), 12);
        validate_phrase(&phrase).unwrap();
    }

    #[test]
    fn generated_phrases_differ() {
        assert_ne!(generate_phrase(), generate_phrase());
    }

    #[test]
    fn rejects_wrong_word_count() {
        assert!(matches!(
            validate_phrase("abandon abandon about"),
            Err(MnemonicError::InvalidWordCount)
        ));
    }

    #[test]
    fn rejects_bad_checksum() {
        let phrase = "abandon abandon abandon abandon abandon abandon \
             abandon abandon abandon abandon abandon abandon";
        assert!(matches!(
            validate_phrase(phrase),
            Err(MnemonicError::InvalidPhrase)
        ));
    }

    #[test]
    fn seed_expansion_is_deterministic() {
        let seed = phrase_to_seed(TEST_PHRASE).unwrap();
        assert_eq!(
            hex::encode(seed),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
        assert_eq!(seed, phrase_to_seed(TEST_PHRASE).unwrap());
    }

    #[test]
    fn derivation_paths_match_templates() {
        assert_eq!(Chain::Solana.derivation_path(0), "m/44'/501'/0'/0'");
        assert_eq!(Chain::Solana.derivation_path(7), "m/44'/501'/7'/0'");
        assert_eq!(Chain::Ethereum.derivation_path(0), "m/44'/60'/0'/0/0");
        assert_eq!(Chain::Ethereum.derivation_path(7), "m/44'/60'/7'/0/0");
    }

    #[test]
    fn rejects_hardened_index_overflow() {
        let seed = [0u8; SEED_LEN];
        for chain in [Chain::Solana, Chain::Ethereum] {
            assert!(matches!(
                chain.derive_key_pair(&seed, 1 << 31),
                Err(DerivationError::IndexOutOfRange)
            ));
        }
    }

    #[test]
    fn rejects_malformed_seed() {
        for chain in [Chain::Solana, Chain::Ethereum] {
            assert!(matches!(
                chain.derive_key_pair(&[0u8; 32], 0),
                Err(DerivationError::InvalidSeed)
            ));
        }
    }
}
