//! # Folio Infrastructure
//!
//! Concrete implementations of the ports defined in `folio-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - JWT session tokens + OAuth identity provider
//! - `rate-limit` - Keyed rate limiting via governor

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use database::{DatabaseConnections, InMemoryStore};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService, OAuthConfig, OAuthIdentityProvider};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
