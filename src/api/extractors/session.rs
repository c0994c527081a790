//! Optional player session for endpoints open to guests.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::api::middleware::session_token;
use crate::api::AppState;

/// The signed-in player, if the request carries a valid session token.
/// Missing and invalid tokens both yield `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaybePlayer(pub Option<Uuid>);

#[async_trait]
impl FromRequestParts<AppState> for MaybePlayer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let player = session_token(&parts.headers).and_then(|token| {
            match state.services.auth().verify_token(&token) {
                Ok(claims) => Some(claims.uuid),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring invalid session token");
                    None
                }
            }
        });

        Ok(MaybePlayer(player))
    }
}
