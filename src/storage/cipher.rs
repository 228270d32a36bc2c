//! At-rest encryption for persisted blobs.
//!
//! DESIGN
//! ======
//! [`BlobCipher`] is the injected crypto capability; the credential store
//! never touches a primitive directly. [`AesGcmCipher`] is the shipped
//! implementation: AES-256-GCM with a random 96-bit nonce per seal, emitted
//! as `base64(nonce || ciphertext)`. The key is the SHA-256 digest of the
//! configured secret.

#[cfg(test)]
#[path = "cipher_test.rs"]
mod cipher_test;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("failed to encrypt blob")]
    Seal,
    #[error("failed to decrypt blob (wrong key or tampered data)")]
    Open,
    #[error("blob is not valid base64")]
    Encoding,
    #[error("blob is shorter than the nonce")]
    Truncated,
}

/// Injected encrypt/decrypt routine for persisted blobs.
pub trait BlobCipher: Send + Sync {
    fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError>;
    fn open(&self, blob: &str) -> Result<Vec<u8>, CipherError>;
}

pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    /// Derive the AES-256 key from `secret`.
    pub fn from_secret(secret: &str) -> Result<Self, CipherError> {
        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CipherError::Seal)?;
        Ok(Self { cipher })
    }
}

impl BlobCipher for AesGcmCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::rng().random();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| CipherError::Seal)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    fn open(&self, blob: &str) -> Result<Vec<u8>, CipherError> {
        let sealed = STANDARD
            .decode(blob.trim())
            .map_err(|_| CipherError::Encoding)?;
        if sealed.len() < NONCE_LEN {
            return Err(CipherError::Truncated);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Open)
    }
}
