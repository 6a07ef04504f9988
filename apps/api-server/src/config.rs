//! Application configuration loaded from environment variables.

use std::env;

use folio_core::AccessPolicy;
use folio_infra::database::DatabaseConfig;
use folio_infra::{JwtConfig, OAuthConfig, RateLimitConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Comma-separated sign-in allow-list.
    pub allowed_emails: String,
    /// Comma-separated reviewer list.
    pub reviewer_emails: String,
    pub oauth: OAuthConfig,
    pub jwt: JwtConfig,
    pub like_rate_limit: RateLimitConfig,
    /// Mark cookies `Secure` when the public callback is served over HTTPS.
    pub secure_cookies: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            config.max_connections = env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(config.max_connections);
            config.min_connections = env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(config.min_connections);
            config
        });

        let oauth = OAuthConfig::from_env();
        let secure_cookies = oauth.redirect_url.starts_with("https://");

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            allowed_emails: env::var("ALLOWED_EMAILS").unwrap_or_default(),
            reviewer_emails: env::var("REVIEWER_EMAILS").unwrap_or_default(),
            oauth,
            jwt: JwtConfig::from_env(),
            like_rate_limit: RateLimitConfig::from_env(),
            secure_cookies,
        }
    }

    pub fn access_policy(&self) -> AccessPolicy {
        let policy = AccessPolicy::from_lists(&self.allowed_emails, &self.reviewer_emails);
        if self.allowed_emails.trim().is_empty() {
            tracing::warn!("ALLOWED_EMAILS is empty; nobody will be able to sign in");
        }
        policy
    }
}
