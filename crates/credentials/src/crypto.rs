// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret sealing: AES-256-GCM with a fresh nonce per encryption.
//!
//! Sealed values carry base64 ciphertext and nonce separately, matching the
//! persisted {ciphertext, nonce} column pairs.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use orq_core::{Error, Result, Sealed};
use pbkdf2::pbkdf2_hmac_array;
use rand::RngCore;
use sha2::Sha256;

/// AES-GCM nonce size in bytes.
const NONCE_SIZE: usize = 12;
/// PBKDF2 iterations for passphrase-derived keys.
const PBKDF2_ITERATIONS: u32 = 100_000;
/// Fixed application salt for passphrase derivation. Uniqueness per secret
/// comes from the per-encryption nonce, not the key.
const KEY_SALT: &[u8] = b"orq-credential-sealing-v1";

/// Seals and opens credential fields with a tenant-wide master key.
#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; 32],
}

impl SecretCipher {
    /// Build from a raw 256-bit key.
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Derive the key from a passphrase with PBKDF2-SHA256.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let key = pbkdf2_hmac_array::<Sha256, 32>(
            passphrase.as_bytes(),
            KEY_SALT,
            PBKDF2_ITERATIONS,
        );
        Self { key }
    }

    /// Encrypt a plaintext field. Every call draws a fresh random nonce.
    pub fn seal(&self, plaintext: &str) -> Result<Sealed> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| Error::Crypto(format!("cipher init failed: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| Error::Crypto(format!("encryption failed: {e:?}")))?;

        Ok(Sealed { ciphertext: BASE64.encode(ciphertext), nonce: BASE64.encode(nonce_bytes) })
    }

    /// Decrypt a sealed field back to plaintext.
    pub fn open(&self, sealed: &Sealed) -> Result<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| Error::Crypto(format!("cipher init failed: {e}")))?;

        let nonce_bytes = BASE64
            .decode(&sealed.nonce)
            .map_err(|e| Error::Crypto(format!("invalid nonce encoding: {e}")))?;
        if nonce_bytes.len() != NONCE_SIZE {
            return Err(Error::Crypto(format!("nonce must be {NONCE_SIZE} bytes")));
        }
        let ciphertext = BASE64
            .decode(&sealed.ciphertext)
            .map_err(|e| Error::Crypto(format!("invalid ciphertext encoding: {e}")))?;

        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| Error::Crypto("decryption failed: wrong key or corrupted data".into()))?;
        String::from_utf8(plaintext)
            .map_err(|_| Error::Crypto("decrypted payload is not UTF-8".into()))
    }
}

#[cfg(test)]
#[path = "crypto_tests.rs"]
mod tests;
