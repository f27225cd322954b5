//! Passphrase sealing for DCTDM payloads: PBKDF2-HMAC-SHA256 key derivation
//! feeding AES-256-GCM. Generic and JPEG-agnostic; the only link to the
//! codec crate is implementing its [`dctdm_core::Transform`] trait.

pub mod error;

pub use error::CryptoError;

use aes_gcm::aead::{Aead, AeadCore, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use dctdm_core::error::{DctdmError, Result as DctdmResult};
use dctdm_core::Transform;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const PBKDF2_ROUNDS: u32 = 100_000;

pub type Result<T> = std::result::Result<T, CryptoError>;

fn derive_key(passphrase: &str, salt: &[u8; SALT_LEN]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

/// Encrypts `plaintext` under `passphrase`, returning `salt ‖ nonce ‖ ciphertext`.
pub fn seal(passphrase: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut key_bytes = derive_key(passphrase, &salt);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    key_bytes.zeroize();

    let mut out = Vec::with_capacity(SALT_LEN + nonce.len() + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Reverses [`seal`]; fails with [`CryptoError::AuthenticationFailed`] on a
/// wrong passphrase or tampered ciphertext, or [`CryptoError::MalformedCiphertext`]
/// if the blob is too short to contain a salt and nonce.
pub fn open(passphrase: &str, sealed: &[u8]) -> Result<Vec<u8>> {
    let nonce_len = 12; // AES-GCM's standard nonce length
    if sealed.len() < SALT_LEN + nonce_len {
        return Err(CryptoError::MalformedCiphertext);
    }
    let salt: [u8; SALT_LEN] = sealed[..SALT_LEN].try_into().unwrap();
    let nonce = Nonce::from_slice(&sealed[SALT_LEN..SALT_LEN + nonce_len]);
    let ciphertext = &sealed[SALT_LEN + nonce_len..];

    let mut key_bytes = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    key_bytes.zeroize();
    Ok(plaintext)
}

/// A [`Transform`] that seals and opens payload bytes under a fixed passphrase.
pub struct PassphraseTransform {
    passphrase: String,
}

impl PassphraseTransform {
    pub fn new(passphrase: impl Into<String>) -> Self {
        PassphraseTransform {
            passphrase: passphrase.into(),
        }
    }
}

impl Drop for PassphraseTransform {
    fn drop(&mut self) {
        self.passphrase.zeroize();
    }
}

impl Transform for PassphraseTransform {
    fn seal(&self, plaintext: &[u8]) -> DctdmResult<Vec<u8>> {
        seal(&self.passphrase, plaintext).map_err(|e| DctdmError::Transform(Box::new(e)))
    }

    fn open(&self, sealed: &[u8]) -> DctdmResult<Vec<u8>> {
        open(&self.passphrase, sealed).map_err(|e| DctdmError::Transform(Box::new(e)))
    }
}
