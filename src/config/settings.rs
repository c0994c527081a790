//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;

use super::constants::{
    DEFAULT_ASSETS_DIR, DEFAULT_CORS_ORIGINS, DEFAULT_DATABASE_URL, DEFAULT_FRONTEND_DOMAIN,
    DEFAULT_IMAGE_DIR, DEFAULT_MODRINTH_API_BASE, DEFAULT_MODRINTH_PROJECT_ID,
    DEFAULT_RATE_LIMIT_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECONDS, DEFAULT_REDIS_URL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_STRIPE_API_BASE, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    jwt_secret: String,
    admin_jwt_secret: String,
    encryption_password: String,
    auth_api_secret: String,
    cosmetic_api_secret: String,
    stripe_api_key: String,
    stripe_webhook_secret: String,
    pub stripe_api_base: String,
    pub frontend_domain: String,
    pub cors_origins: Vec<String>,
    pub image_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub modrinth_api_base: String,
    pub modrinth_project_id: String,
    pub cookie_secure: bool,
    pub rate_limit_requests: u64,
    pub rate_limit_window_seconds: u64,
    /// Read client addresses from `X-Forwarded-For` / `X-Real-IP`.
    pub trust_proxy_headers: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("jwt_secret", &"[REDACTED]")
            .field("admin_jwt_secret", &"[REDACTED]")
            .field("encryption_password", &"[REDACTED]")
            .field("auth_api_secret", &"[REDACTED]")
            .field("cosmetic_api_secret", &"[REDACTED]")
            .field("stripe_api_key", &"[REDACTED]")
            .field("stripe_webhook_secret", &"[REDACTED]")
            .field("stripe_api_base", &self.stripe_api_base)
            .field("frontend_domain", &self.frontend_domain)
            .field("cors_origins", &self.cors_origins)
            .field("image_dir", &self.image_dir)
            .field("assets_dir", &self.assets_dir)
            .field("modrinth_project_id", &self.modrinth_project_id)
            .field("cookie_secure", &self.cookie_secure)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .finish()
    }
}

/// Read a secret, falling back to a development value in debug builds only.
///
/// # Panics
/// Panics in release builds when the variable is missing.
fn secret(name: &str, dev_default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            tracing::warn!("{} not set, using insecure default for development", name);
            dev_default.to_string()
        } else {
            panic!("{} environment variable must be set in production", name);
        }
    })
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn string_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a token secret is too short, or if any secret is missing
    /// in a release build.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = secret("JWT_SECRET", "dev-player-secret-minimum-32-chars!");
        let admin_jwt_secret = secret("ADMIN_JWT_SECRET", "dev-admin-secret-minimum-32-chars!!");

        for (name, value) in [("JWT_SECRET", &jwt_secret), ("ADMIN_JWT_SECRET", &admin_jwt_secret)] {
            if value.len() < MIN_JWT_SECRET_LENGTH {
                panic!("{} must be at least {} characters long", name, MIN_JWT_SECRET_LENGTH);
            }
        }

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect());

        Self {
            database_url: string_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            redis_url: string_or("REDIS_URL", DEFAULT_REDIS_URL),
            server_host: string_or("SERVER_HOST", DEFAULT_SERVER_HOST),
            server_port: parsed_or("SERVER_PORT", DEFAULT_SERVER_PORT),
            jwt_secret,
            admin_jwt_secret,
            encryption_password: secret("ENCRYPTION_PASSWORD", "dev-encryption-password"),
            auth_api_secret: secret("AUTH_API_SECRET", "dev-auth-api-secret"),
            cosmetic_api_secret: secret("COSMETIC_API_SECRET", "dev-cosmetic-api-secret"),
            stripe_api_key: secret("STRIPE_API_KEY", "sk_test_dev"),
            stripe_webhook_secret: secret("STRIPE_WEBHOOK_SECRET", "whsec_dev"),
            stripe_api_base: string_or("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE),
            frontend_domain: string_or("FRONTEND_DOMAIN", DEFAULT_FRONTEND_DOMAIN)
                .trim_end_matches('/')
                .to_string(),
            cors_origins,
            image_dir: PathBuf::from(string_or("IMAGE_DIR", DEFAULT_IMAGE_DIR)),
            assets_dir: PathBuf::from(string_or("ASSETS_DIR", DEFAULT_ASSETS_DIR)),
            modrinth_api_base: string_or("MODRINTH_API_BASE", DEFAULT_MODRINTH_API_BASE),
            modrinth_project_id: string_or("MODRINTH_PROJECT_ID", DEFAULT_MODRINTH_PROJECT_ID),
            cookie_secure: parsed_or("COOKIE_SECURE", !cfg!(debug_assertions)),
            rate_limit_requests: parsed_or("RATE_LIMIT_REQUESTS", DEFAULT_RATE_LIMIT_REQUESTS),
            rate_limit_window_seconds: parsed_or(
                "RATE_LIMIT_WINDOW_SECS",
                DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
            ),
            trust_proxy_headers: parsed_or("TRUST_PROXY_HEADERS", false),
        }
    }

    /// Player token signing secret.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Admin token signing secret.
    pub fn admin_jwt_secret_bytes(&self) -> &[u8] {
        self.admin_jwt_secret.as_bytes()
    }

    /// Password the login-link cipher key is derived from.
    pub fn encryption_password(&self) -> &str {
        &self.encryption_password
    }

    /// Shared secret the game server presents when requesting login links.
    pub fn auth_api_secret(&self) -> &str {
        &self.auth_api_secret
    }

    /// Bearer secret of the cosmetics API.
    pub fn cosmetic_api_secret(&self) -> &str {
        &self.cosmetic_api_secret
    }

    pub fn stripe_api_key(&self) -> &str {
        &self.stripe_api_key
    }

    pub fn stripe_webhook_secret(&self) -> &str {
        &self.stripe_webhook_secret
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Build a configuration with fixed test values.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_tests() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            jwt_secret: "test-player-secret-for-testing-only!".to_string(),
            admin_jwt_secret: "test-admin-secret-for-testing-only!!".to_string(),
            encryption_password: "test-encryption-password".to_string(),
            auth_api_secret: "test-auth-api-secret".to_string(),
            cosmetic_api_secret: "test-cosmetic-secret".to_string(),
            stripe_api_key: "sk_test_123".to_string(),
            stripe_webhook_secret: "whsec_test".to_string(),
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            frontend_domain: "https://shop.test".to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            modrinth_api_base: DEFAULT_MODRINTH_API_BASE.to_string(),
            modrinth_project_id: DEFAULT_MODRINTH_PROJECT_ID.to_string(),
            cookie_secure: false,
            rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
            trust_proxy_headers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::for_tests();
        let printed = format!("{:?}", config);

        assert!(!printed.contains("test-player-secret"));
        assert!(!printed.contains("sk_test_123"));
        assert!(!printed.contains("whsec_test"));
        assert!(printed.contains("[REDACTED]"));
        assert!(printed.contains("shop.test"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::for_tests();
        assert_eq!(config.server_addr(), "0.0.0.0:6969");
    }
}
