//! OAuth 2.0 authorization-code identity provider (Google by default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use folio_core::ports::{AuthError, ExternalProfile, IdentityProvider};

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: "http://localhost:8080/api/auth/callback".to_string(),
            authorize_url: GOOGLE_AUTHORIZE_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, fallback: String| std::env::var(key).unwrap_or(fallback);

        let config = Self {
            client_id: var("OAUTH_CLIENT_ID", defaults.client_id),
            client_secret: var("OAUTH_CLIENT_SECRET", defaults.client_secret),
            redirect_url: var("OAUTH_REDIRECT_URL", defaults.redirect_url),
            authorize_url: var("OAUTH_AUTHORIZE_URL", defaults.authorize_url),
            token_url: var("OAUTH_TOKEN_URL", defaults.token_url),
            userinfo_url: var("OAUTH_USERINFO_URL", defaults.userinfo_url),
        };

        if config.client_id.is_empty() {
            tracing::warn!("OAUTH_CLIENT_ID is not set; sign-in will fail");
        }
        config
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

/// Identity provider speaking the standard code flow over HTTPS.
pub struct OAuthIdentityProvider {
    client: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthIdentityProvider {
    pub fn new(config: OAuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl IdentityProvider for OAuthIdentityProvider {
    fn authorize_url(&self, state: &str) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| AuthError::Provider(format!("bad authorize url: {e}")))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AuthError> {
        let token: TokenResponse = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::Provider(format!("token exchange failed: {e}")))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("malformed token response: {e}")))?;

        let info: UserInfo = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::Provider(format!("userinfo request failed: {e}")))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("malformed userinfo response: {e}")))?;

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AuthError::Provider("profile has no email".to_string()))?;

        Ok(ExternalProfile {
            email: email.trim().to_lowercase(),
            name: info.name,
            email_verified: info.email_verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_carries_client_and_state() {
        let provider = OAuthIdentityProvider::new(OAuthConfig {
            client_id: "client-123".to_string(),
            ..OAuthConfig::default()
        })
        .unwrap();

        let url = provider.authorize_url("csrf-token").unwrap();

        assert!(url.starts_with(GOOGLE_AUTHORIZE_URL));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=csrf-token"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_bad_authorize_url_is_provider_error() {
        let provider = OAuthIdentityProvider::new(OAuthConfig {
            authorize_url: "not a url".to_string(),
            ..OAuthConfig::default()
        })
        .unwrap();

        assert!(matches!(
            provider.authorize_url("s"),
            Err(AuthError::Provider(_))
        ));
    }
}
