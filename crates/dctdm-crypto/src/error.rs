use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("wrong passphrase or tampered ciphertext")]
    AuthenticationFailed,

    #[error("ciphertext too short to contain a salt and nonce")]
    MalformedCiphertext,
}
