//! Session and API-secret authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{AUTH_COOKIE_NAME, BEARER_TOKEN_PREFIX};
use crate::domain::Admin;
use crate::errors::AppError;

/// Player resolved from a session token
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurrentPlayer {
    pub uuid: Uuid,
}

/// Admin resolved from an admin session token
#[derive(Clone, Debug)]
pub struct CurrentAdmin {
    pub id: i64,
    pub username: String,
}

impl From<Admin> for CurrentAdmin {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Session token from the `auth` cookie, or else the bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE_NAME) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    bearer_token(headers).map(str::to_string)
}

/// Player authentication middleware.
///
/// Verifies the session token and injects [`CurrentPlayer`] into the
/// request extensions.
pub async fn player_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let claims = state.services.auth().verify_token(&token)?;

    request
        .extensions_mut()
        .insert(CurrentPlayer { uuid: claims.uuid });

    Ok(next.run(request).await)
}

/// Admin authentication middleware.
///
/// The token must be a valid admin token and the admin must still exist.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let admin = state.services.admins().authenticate(&token).await?;

    request.extensions_mut().insert(CurrentAdmin::from(admin));

    Ok(next.run(request).await)
}

/// Game server authentication for the cosmetics API.
pub async fn cosmetic_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    if presented != state.config.cosmetic_api_secret() {
        tracing::warn!("Cosmetics API called with a wrong secret");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    #[test]
    fn test_cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; auth=cookie-token"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        assert_eq!(session_token(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        assert_eq!(session_token(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_missing_or_malformed_token() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(session_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(session_token(&headers).is_none());
    }
}
