use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// BIP-39 seed length in bytes.
pub const MNEMONIC_SEED_LENGTH: usize = 64;

/// Recover the BIP-39 seed from an English mnemonic phrase.
///
/// The phrase is NFKD-normalized and its checksum validated; `passphrase`
/// is the optional BIP-39 salt extension (empty string for none).
pub fn seed_from_mnemonic(
    phrase: &str,
    passphrase: &str,
) -> Result<Zeroizing<[u8; MNEMONIC_SEED_LENGTH]>, CryptoError> {
    let mnemonic = Mnemonic::parse_in(Language::English, phrase)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_seed(passphrase)))
}

/// Generate a fresh English mnemonic from OS entropy.
///
/// `word_count` must be one of 12, 15, 18, 21 or 24.
pub fn generate_mnemonic(word_count: usize) -> Result<Zeroizing<String>, CryptoError> {
    if !matches!(word_count, 12 | 15 | 18 | 21 | 24) {
        return Err(CryptoError::InvalidMnemonic(format!(
            "unsupported word count {}",
            word_count
        )));
    }
    // 11 bits per word, one checksum bit per 32 bits of entropy.
    let mut entropy = Zeroizing::new(vec![0u8; word_count / 3 * 4]);
    OsRng.fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}
