use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};
use tiny_hderive::bip32::ExtendedPrivKey;

use super::{Chain, ChainKeyPair, DerivationError};

pub const ETHEREUM_BASE_PATH: &str = "m/44'/60'";

/// BIP32 derivation at `m/44'/60'/{index}'/0/0`.
///
/// The address is the last 20 bytes of the Keccak-256 hash of the
/// uncompressed public key, checksum-cased per EIP-55.
pub(super) fn derive_key_pair(seed: &[u8], index: u32) -> Result<ChainKeyPair, DerivationError> {
    let path = Chain::Ethereum.derivation_path(index);
    let derived = ExtendedPrivKey::derive(seed, path.as_str())
        .map_err(|_| DerivationError::DerivationFailed)?;
    let secret = derived.secret();

    let signing_key = SigningKey::from_bytes(k256::FieldBytes::from_slice(&secret))
        .map_err(|_| DerivationError::DerivationFailed)?;
    let public = signing_key.verifying_key().to_encoded_point(false);

    // Skip the 0x04 prefix of the SEC1 encoding
    let hash = Keccak256::digest(&public.as_bytes()[1..]);

    Ok(ChainKeyPair {
        secret,
        address: to_checksum_address(&hash[12..]),
    })
}

/// EIP-55 mixed-case checksum encoding
fn to_checksum_address(bytes: &[u8]) -> String {
    let lower = hex::encode(bytes);
    let digest = Keccak256::digest(lower.as_bytes());

    let mut address = String::with_capacity(2 + lower.len());
    address.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            address.push(c.to_ascii_uppercase());
        } else {
            address.push(c);
        }
    }
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::tests::TEST_PHRASE;
    use crate::crypto::phrase_to_seed;

    #[test]
    fn reference_addresses() {
        let seed = phrase_to_seed(TEST_PHRASE).unwrap();
        let keys = Chain::Ethereum.derive_key_pair(&seed, 0).unwrap();
        assert_eq!(keys.address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert_eq!(
            hex::encode(keys.secret),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );

        let keys = Chain::Ethereum.derive_key_pair(&seed, 1).unwrap();
        assert_eq!(keys.address, "0x78839F6054d7ed13918bAe0473BA31b1Ca9D7265");
    }

    #[test]
    fn same_index_same_keys() {
        let seed = phrase_to_seed(TEST_PHRASE).unwrap();
        let a = Chain::Ethereum.derive_key_pair(&seed, 5).unwrap();
        let b = Chain::Ethereum.derive_key_pair(&seed, 5).unwrap();
        assert_eq!(a.secret, b.secret);
        assert_eq!(a.address, b.address);
    }

    #[test]
    fn checksum_casing() {
        // EIP-55 reference vector
        let bytes = hex::decode("fb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert_eq!(
            to_checksum_address(&bytes),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }
}
