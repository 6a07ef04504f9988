//! Authentication ports: session tokens and the OAuth identity provider.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Role;

/// Claims stored in a signed session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

/// Issues and validates signed session tokens.
pub trait TokenService: Send + Sync {
    /// Issue a session token for a signed-in user.
    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        name: Option<&str>,
        role: Role,
    ) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Profile returned by the identity provider after a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
}

/// OAuth authorization-code identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to; `state` is echoed back to the callback.
    fn authorize_url(&self, state: &str) -> Result<String, AuthError>;

    /// Exchange an authorization code for the user's profile.
    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider error: {0}")]
    Provider(String),
}
