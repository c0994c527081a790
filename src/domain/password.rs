//! Admin password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Well-formed hash that matches no password; verified against when the
/// admin does not exist so both paths cost the same.
const UNMATCHABLE_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$2vE7QG0nLQ6m2Z4y6mJ8l3q8yT1YkzP3bqR5m0Yy7m8";

/// Argon2 hash of an admin password. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

impl HashedPassword {
    /// Hash a new password after checking its length.
    pub fn create(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))
    }

    /// Wrap a hash loaded from storage.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Stand-in used when no admin matches a username.
    pub fn unmatchable() -> Self {
        Self(UNMATCHABLE_HASH.to_string())
    }

    /// Whether the plain text matches. Malformed stored hashes never match.
    pub fn matches(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored admin password hash is malformed: {}", e);
                false
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
