//! Credential transport and storage settings.
//!
//! Clients encrypt passwords with the server's RSA public key before sending
//! them. The matching private key is read from a PEM file
//! (`RSA_PRIVATE_KEY_PATH`) or inline from `RSA_PRIVATE_KEY`; the path wins
//! when both are set.

use std::{env, fs, io};

#[derive(Clone)]
pub struct CryptoConfig {
    /// PEM encoded RSA private key (PKCS#8 or PKCS#1)
    pub rsa_private_key_pem: Option<String>,
    /// bcrypt work factor for stored password hashes
    pub bcrypt_cost: u32,
}

impl CryptoConfig {
    pub const DEFAULT_BCRYPT_COST: u32 = 12;

    /// # Errors
    ///
    /// Fails when `RSA_PRIVATE_KEY_PATH` is set but the file cannot be read.
    pub fn from_env() -> io::Result<Self> {
        let rsa_private_key_pem = match env::var("RSA_PRIVATE_KEY_PATH") {
            Ok(path) => Some(fs::read_to_string(path)?),
            Err(_) => env::var("RSA_PRIVATE_KEY").ok(),
        };

        Ok(Self {
            rsa_private_key_pem,
            bcrypt_cost: crate::env_or("BCRYPT_COST", Self::DEFAULT_BCRYPT_COST),
        })
    }
}

// Never print key material.
impl std::fmt::Debug for CryptoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoConfig")
            .field(
                "rsa_private_key_pem",
                &self.rsa_private_key_pem.as_ref().map(|_| "<redacted>"),
            )
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}
