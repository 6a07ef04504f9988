//! Authentication implementations.

mod jwt;
mod oauth;

pub use jwt::{JwtConfig, JwtTokenService};
pub use oauth::{OAuthConfig, OAuthIdentityProvider};
