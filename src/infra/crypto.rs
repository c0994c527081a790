//! Login link tokens.
//!
//! A link token is `nonce (12 bytes) || AES-256-GCM ciphertext+tag` over a
//! small JSON payload, encoded as unpadded URL-safe base64 so it can sit in
//! a query string.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::LOGIN_LINK_TTL_SECONDS;
use crate::errors::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_CONTEXT: &[u8] = b"merch-api/login-link/aes-256-gcm/v1";

/// Contents of a login link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPayload {
    pub username: String,
    pub uuid: Uuid,
    /// Issue time, seconds since the epoch
    pub iat: i64,
}

impl LinkPayload {
    pub fn new(username: String, uuid: Uuid) -> Self {
        Self {
            username,
            uuid,
            iat: chrono::Utc::now().timestamp(),
        }
    }

    /// Whether the link is still usable at `now` (seconds since the epoch).
    pub fn is_fresh(&self, now: i64) -> bool {
        let age = now - self.iat;
        (0..=LOGIN_LINK_TTL_SECONDS).contains(&age)
    }
}

/// Seals and opens login link tokens with a key derived from a passphrase.
pub struct LinkCipher {
    key: [u8; 32],
}

impl LinkCipher {
    pub fn from_passphrase(passphrase: &str) -> AppResult<Self> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(passphrase.as_bytes())
            .map_err(|e| AppError::internal(format!("Key derivation failed: {}", e)))?;
        mac.update(KEY_CONTEXT);
        Ok(Self {
            key: mac.finalize().into_bytes().into(),
        })
    }

    fn cipher(&self) -> AppResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| AppError::internal(format!("Invalid link key: {}", e)))
    }

    pub fn seal(&self, payload: &LinkPayload) -> AppResult<String> {
        let plaintext = serde_json::to_vec(payload)
            .map_err(|e| AppError::internal(format!("Link payload serialization failed: {}", e)))?;

        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = self
            .cipher()?
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
            .map_err(|_| AppError::internal("Link encryption failed"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Decrypt a token. Anything malformed or tampered with is unauthorized.
    pub fn open(&self, token: &str) -> AppResult<LinkPayload> {
        let data = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| AppError::Unauthorized)?;
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(AppError::Unauthorized);
        }

        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AppError::Unauthorized)?;

        serde_json::from_slice(&plaintext).map_err(|_| AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_and_open() {
        let cipher = LinkCipher::from_passphrase("link-secret").unwrap();
        let payload = LinkPayload::new("Steve".to_string(), Uuid::new_v4());

        let token = cipher.seal(&payload).unwrap();
        assert!(!token.contains('+') && !token.contains('/') && !token.contains('='));
        assert_eq!(cipher.open(&token).unwrap(), payload);
    }

    #[test]
    fn test_wrong_passphrase_rejected() {
        let payload = LinkPayload::new("Alex".to_string(), Uuid::new_v4());
        let token = LinkCipher::from_passphrase("one").unwrap().seal(&payload).unwrap();

        let other = LinkCipher::from_passphrase("two").unwrap();
        assert!(matches!(other.open(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_garbage_rejected() {
        let cipher = LinkCipher::from_passphrase("link-secret").unwrap();
        assert!(cipher.open("not base64 !!").is_err());
        assert!(cipher.open("c2hvcnQ").is_err());
    }

    #[test]
    fn test_freshness_window() {
        let mut payload = LinkPayload::new("Steve".to_string(), Uuid::new_v4());
        payload.iat = 1_000;

        assert!(payload.is_fresh(1_000));
        assert!(payload.is_fresh(1_000 + LOGIN_LINK_TTL_SECONDS));
        assert!(!payload.is_fresh(1_001 + LOGIN_LINK_TTL_SECONDS));
        assert!(!payload.is_fresh(999));
    }
}
