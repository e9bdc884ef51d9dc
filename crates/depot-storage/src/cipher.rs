//! Key derivation and per-value authenticated encryption.
//! Keys come from PBKDF2-HMAC-SHA1 over the user password and the database
//! salt, and are re-derived for every call.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use depot_core::{Salt, NONCE_LEN};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use thiserror::Error;
use zeroize::Zeroizing;

/// PBKDF2 iteration count. Changing it breaks every existing sealed value.
pub const PBKDF2_ROUNDS: u32 = 4096;
/// 256-bit key for AES-256-GCM.
pub const KEY_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("cipher init failed: {0}")]
    Init(String),
    #[error("encrypt failed")]
    Seal,
    /// Wrong password, or the ciphertext/nonce was tampered with.
    #[error("authentication failed")]
    Authentication,
    #[error("nonce must be {NONCE_LEN} bytes, got {0}")]
    NonceLength(usize),
}

/// Output of [`encrypt`]: ciphertext with the GCM tag appended, plus the fresh nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedValue {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
}

/// Derive the symmetric key for `password` under the database salt.
/// Deterministic for a given `(password, salt)` pair.
pub fn derive_key(password: &[u8], salt: &Salt) -> Zeroizing<[u8; KEY_LEN]> {
    pbkdf2_sha1(password, salt.as_bytes())
}

fn pbkdf2_sha1(password: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha1>(password, salt, PBKDF2_ROUNDS, &mut *key);
    key
}

/// Seal `plaintext` under a key derived from `password`, with a new random nonce.
pub fn encrypt(password: &[u8], salt: &Salt, plaintext: &[u8]) -> Result<SealedValue, CipherError> {
    let cipher = build_cipher(password, salt)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CipherError::Seal)?;

    let mut out = [0u8; NONCE_LEN];
    out.copy_from_slice(nonce.as_slice());
    Ok(SealedValue {
        ciphertext,
        nonce: out,
    })
}

/// Open a sealed value. Any authentication failure is reported as
/// [`CipherError::Authentication`].
pub fn decrypt(
    password: &[u8],
    salt: &Salt,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    if nonce.len() != NONCE_LEN {
        return Err(CipherError::NonceLength(nonce.len()));
    }

    let cipher = build_cipher(password, salt)?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CipherError::Authentication)
}

fn build_cipher(password: &[u8], salt: &Salt) -> Result<Aes256Gcm, CipherError> {
    let key = derive_key(password, salt);
    Aes256Gcm::new_from_slice(&key[..]).map_err(|e| CipherError::Init(e.to_string()))
}
