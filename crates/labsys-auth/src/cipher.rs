//! Decryption of credentials sent by clients.
//!
//! Passwords never travel in plain text: the client encrypts them with the
//! server's RSA public key (PKCS#1 v1.5) and sends the base64 encoded
//! ciphertext.

use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::{
    Pkcs1v15Encrypt, RsaPrivateKey,
    pkcs1::DecodeRsaPrivateKey,
    pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding},
};

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("decryption failed: {0}")]
    Decrypt(#[from] rsa::Error),
    #[error("plaintext is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid RSA private key: {0}")]
    Key(String),
}

/// Turns a client supplied ciphertext back into the plain credential.
pub trait CredentialCipher: Send + Sync {
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

#[derive(Clone)]
pub struct RsaCipher {
    key: RsaPrivateKey,
}

impl RsaCipher {
    pub fn new(key: RsaPrivateKey) -> Self {
        Self { key }
    }

    /// Loads a PEM private key, PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1
    /// (`BEGIN RSA PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self, CipherError> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| CipherError::Key(e.to_string()))?;
        Ok(Self::new(key))
    }

    /// The public half, as handed to clients.
    pub fn public_key_pem(&self) -> Result<String, CipherError> {
        self.key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CipherError::Key(e.to_string()))
    }
}

impl CredentialCipher for RsaCipher {
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let bytes = STANDARD.decode(ciphertext.trim())?;
        let plain = self.key.decrypt(Pkcs1v15Encrypt, &bytes)?;
        Ok(String::from_utf8(plain)?)
    }
}

impl std::fmt::Debug for RsaCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaCipher").finish_non_exhaustive()
    }
}
