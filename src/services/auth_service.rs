//! Player authentication - login links from the game server and session tokens.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, TOKEN_EXPIRATION_DAYS};
use crate::domain::AccountResponse;
use crate::errors::{AppError, AppResult};
use crate::infra::{LinkCipher, LinkPayload, UnitOfWork};

/// Player session token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerClaims {
    pub uuid: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// Admin session token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub admin_id: i64,
    pub exp: i64,
    pub iat: i64,
}

/// Login link handed to the game server
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginLink {
    #[schema(example = "https://servus.kryeit.com/login?t=...")]
    pub link: String,
}

/// Sign claims with HS256.
pub(crate) fn issue_token<C: Serialize>(claims: &C, secret: &[u8]) -> AppResult<String> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret),
    )?)
}

/// Verify an HS256 token and return its claims.
pub(crate) fn decode_token<C: DeserializeOwned>(token: &str, secret: &[u8]) -> AppResult<C> {
    let data = decode::<C>(token, &DecodingKey::from_secret(secret), &Validation::default())?;
    Ok(data.claims)
}

/// (issued at, expires at) for a new session token
pub(crate) fn token_window() -> (i64, i64) {
    let now = Utc::now();
    (
        now.timestamp(),
        (now + Duration::days(TOKEN_EXPIRATION_DAYS)).timestamp(),
    )
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create or refresh the player and return a login link, redeemable until
    /// it expires.
    /// Only the game server, holding the auth API secret, may call this.
    async fn generate_link(
        &self,
        secret: &str,
        username: String,
        uuid: Uuid,
    ) -> AppResult<LoginLink>;

    /// Redeem a login link for a session token.
    async fn redeem_link(&self, link_token: &str) -> AppResult<AccountResponse>;

    /// Verify a player session token.
    fn verify_token(&self, token: &str) -> AppResult<PlayerClaims>;
}

pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    cipher: LinkCipher,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> AppResult<Self> {
        let cipher = LinkCipher::from_passphrase(config.encryption_password())?;
        Ok(Self {
            uow,
            config,
            cipher,
        })
    }

    fn issue_player_token(&self, uuid: Uuid) -> AppResult<String> {
        let (iat, exp) = token_window();
        issue_token(&PlayerClaims { uuid, exp, iat }, self.config.jwt_secret_bytes())
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn generate_link(
        &self,
        secret: &str,
        username: String,
        uuid: Uuid,
    ) -> AppResult<LoginLink> {
        if secret != self.config.auth_api_secret() {
            return Err(AppError::Forbidden);
        }
        if username.trim().is_empty() {
            return Err(AppError::bad_request("Username is required"));
        }

        let player = self.uow.players().upsert(uuid, username).await?;
        let token = self
            .cipher
            .seal(&LinkPayload::new(player.username.clone(), player.uuid))?;

        tracing::info!(player = %player.uuid, "Login link generated");
        Ok(LoginLink {
            link: format!("{}/login?t={}", self.config.frontend_domain, token),
        })
    }

    async fn redeem_link(&self, link_token: &str) -> AppResult<AccountResponse> {
        let payload = self.cipher.open(link_token)?;
        if !payload.is_fresh(Utc::now().timestamp()) {
            tracing::debug!(player = %payload.uuid, "Expired login link");
            return Err(AppError::Unauthorized);
        }

        let player = self
            .uow
            .players()
            .find(payload.uuid)
            .await?
            .ok_or(AppError::Unauthorized)?;
        self.uow.players().touch(player.uuid).await?;

        let token = self.issue_player_token(player.uuid)?;
        Ok(AccountResponse::with_token(player, token))
    }

    fn verify_token(&self, token: &str) -> AppResult<PlayerClaims> {
        decode_token(token, self.config.jwt_secret_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let secret = b"a-secret-that-is-long-enough-for-hs256";
        let (iat, exp) = token_window();
        let uuid = Uuid::new_v4();

        let token = issue_token(&PlayerClaims { uuid, exp, iat }, secret).unwrap();
        let claims: PlayerClaims = decode_token(&token, secret).unwrap();
        assert_eq!(claims.uuid, uuid);
        assert_eq!(claims.exp - claims.iat, TOKEN_EXPIRATION_DAYS * 86_400);
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let (iat, exp) = token_window();
        let token = issue_token(&AdminClaims { admin_id: 1, exp, iat }, b"first-secret").unwrap();
        assert!(matches!(
            decode_token::<AdminClaims>(&token, b"second-secret"),
            Err(AppError::Jwt(_))
        ));
    }

    #[test]
    fn test_player_token_is_not_an_admin_token() {
        let secret = b"shared-secret";
        let (iat, exp) = token_window();
        let token = issue_token(&PlayerClaims { uuid: Uuid::new_v4(), exp, iat }, secret).unwrap();
        assert!(decode_token::<AdminClaims>(&token, secret).is_err());
    }
}
