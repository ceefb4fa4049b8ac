use hmac::{Hmac, Mac};
use sha2::Sha512;

use super::{ChainKeyPair, DerivationError};

pub const SOLANA_BASE_PATH: &str = "m/44'/501'";

/// SLIP-0010 master key derivation constant for the Ed25519 curve
const MASTER_KEY: &[u8] = b"ed25519 seed";

const COIN_TYPE: u32 = 501;
const HARDENED_OFFSET: u32 = 0x8000_0000;

type HmacSha512 = Hmac<Sha512>;

/// SLIP-0010 hardened-only derivation at `m/44'/501'/{index}'/0'`.
///
/// The address is the base58 encoding of the raw public key, no
/// additional hashing.
pub(super) fn derive_key_pair(seed: &[u8], index: u32) -> Result<ChainKeyPair, DerivationError> {
    let (mut key, mut chain_code) = master_key(seed);
    for segment in [44, COIN_TYPE, index, 0] {
        (key, chain_code) = derive_child(&key, &chain_code, segment);
    }

    let secret =
        ed25519_dalek::SecretKey::from_bytes(&key).map_err(|_| DerivationError::DerivationFailed)?;
    let public = ed25519_dalek::PublicKey::from(&secret);

    Ok(ChainKeyPair {
        secret: key,
        address: bs58::encode(public.as_bytes()).into_string(),
    })
}

/// I = HMAC-SHA512("ed25519 seed", seed); IL is the key, IR the chain code
fn master_key(seed: &[u8]) -> ([u8; 32], [u8; 32]) {
    let mut mac = HmacSha512::new_from_slice(MASTER_KEY).unwrap();
    mac.update(seed);
    split(mac.finalize().into_bytes().as_slice())
}

/// I = HMAC-SHA512(chain_code, 0x00 || key || ser32(segment + 2^31))
fn derive_child(key: &[u8; 32], chain_code: &[u8; 32], segment: u32) -> ([u8; 32], [u8; 32]) {
    let hardened = segment | HARDENED_OFFSET;

    let mut mac = HmacSha512::new_from_slice(chain_code).unwrap();
    mac.update(&[0x00]);
    mac.update(key);
    mac.update(&hardened.to_be_bytes());
    split(mac.finalize().into_bytes().as_slice())
}

fn split(bytes: &[u8]) -> ([u8; 32], [u8; 32]) {
    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&bytes[..32]);
    chain_code.copy_from_slice(&bytes[32..]);
    (key, chain_code)
}
