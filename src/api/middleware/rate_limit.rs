//! Rate limiting middleware using Redis cache.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::api::AppState;

/// Rate limit error response
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));

        (
            StatusCode::TOO_MANY_REQUESTS,
            headers,
            "Too many requests. Please try again later.",
        )
            .into_response()
    }
}

/// Client identifier for rate limiting.
/// Proxy headers are only read when `trust_proxy` is set; otherwise the
/// connection address is used.
fn client_identifier(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
        {
            if let Some(ip) = forwarded.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return ip.to_string();
                }
            }
        }

        if let Some(real_ip) = request
            .headers()
            .get("X-Real-IP")
            .and_then(|h| h.to_str().ok())
        {
            return real_ip.trim().to_string();
        }
    }

    if let Some(connect_info) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limit for link redemption and admin sign-in.
///
/// Fails closed when Redis errors; passes through when no cache is attached.
pub async fn login_rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let Some(cache) = state.cache.clone() else {
        return Ok(next.run(request).await);
    };

    let max_requests = state.config.rate_limit_requests;
    let window = state.config.rate_limit_window_seconds;
    let client_id = client_identifier(&request, state.config.trust_proxy_headers);
    let key = format!("login:{}", client_id);

    let (count, allowed) = match cache.check_rate_limit(&key, max_requests, window).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Login rate limit check failed - denying request");
            return Err(RateLimitError {
                retry_after: window,
            });
        }
    };

    if !allowed {
        tracing::warn!(client = %client_id, count = count, "Login rate limit exceeded");
        return Err(RateLimitError {
            retry_after: window,
        });
    }

    let mut response = next.run(request).await;

    let remaining = max_requests.saturating_sub(count);
    response
        .headers_mut()
        .insert("X-RateLimit-Limit", HeaderValue::from(max_requests));
    response
        .headers_mut()
        .insert("X-RateLimit-Remaining", HeaderValue::from(remaining));

    Ok(response)
}
