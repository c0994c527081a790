//! Application route configuration.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE},
        HeaderValue, Method, StatusCode,
    },
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, admin_auth_routes, admin_routes, asset_routes, cosmetic_routes, image_routes,
    login_link_routes, login_routes, login_session_routes, modpack_routes, order_routes,
    payment_routes, product_routes, public_account_routes, stock_routes,
};
use super::middleware::{
    admin_auth_middleware, cosmetic_auth_middleware, login_rate_limit_middleware,
    player_auth_middleware,
};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::MAX_IMAGE_UPLOAD_BYTES;

const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes(&state))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_UPLOAD_BYTES))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let rate_limited = || middleware::from_fn_with_state(state.clone(), login_rate_limit_middleware);
    let player_only = || middleware::from_fn_with_state(state.clone(), player_auth_middleware);
    let admin_only = || middleware::from_fn_with_state(state.clone(), admin_auth_middleware);

    Router::new()
        .nest(
            "/login",
            login_routes()
                .route_layer(rate_limited())
                .merge(login_link_routes())
                .merge(login_session_routes().route_layer(player_only())),
        )
        .nest(
            "/account",
            account_routes()
                .route_layer(player_only())
                .merge(public_account_routes()),
        )
        .nest(
            "/admin",
            admin_auth_routes()
                .route_layer(rate_limited())
                .merge(admin_routes().route_layer(admin_only())),
        )
        .nest("/products", product_routes(state))
        .nest("/stock", stock_routes(state))
        .nest("/orders", order_routes(state))
        .nest("/payment", payment_routes())
        .nest("/images", image_routes(state))
        .nest(
            "/cosmetics",
            cosmetic_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                cosmetic_auth_middleware,
            )),
        )
        .nest("/assets", asset_routes())
        .nest("/modpack", modpack_routes())
}

/// CORS for the storefront and admin panel origins, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT, COOKIE])
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Root endpoint
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: SERVICE_NAME,
        version: SERVICE_VERSION,
    })
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: ServiceStatus,
    cache: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_check<E: std::fmt::Display>(result: Option<Result<(), E>>) -> Self {
        match result {
            Some(Ok(())) => Self {
                status: "healthy",
                error: None,
            },
            Some(Err(e)) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
            None => Self {
                status: "unavailable",
                error: None,
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.database {
        Some(database) => Some(database.ping().await),
        None => None,
    };
    let cache = match &state.cache {
        Some(cache) => Some(cache.exists("health:ping").await.map(|_| ())),
        None => None,
    };

    let database = ServiceStatus::from_check(database);
    let cache = ServiceStatus::from_check(cache);
    let all_healthy = database.is_healthy() && cache.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        version: SERVICE_VERSION,
        database,
        cache,
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
