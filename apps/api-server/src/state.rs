//! Application state - shared across all handlers.

use std::sync::Arc;

use folio_core::AccessPolicy;
use folio_core::ports::{
    AuthError, IdentityProvider, LikeRepository, PostRepository, RateLimitError, RateLimiter,
    TokenService, UserRepository,
};
use folio_core::services::{AccountService, LikeService, PostLifecycle};
use folio_infra::database::{DatabaseConfig, DatabaseConnections};
use folio_infra::{InMemoryRateLimiter, InMemoryStore, JwtTokenService, OAuthIdentityProvider};

#[cfg(feature = "postgres")]
use folio_infra::database::{PostgresLikeRepository, PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// Failures that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("identity provider: {0}")]
    Identity(#[from] AuthError),

    #[error("rate limiter: {0}")]
    RateLimit(#[from] RateLimitError),
}

/// The three repositories, backed by one store.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            likes: Arc::new(store),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
            likes: Arc::new(PostgresLikeRepository::new(connections.main.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<AccessPolicy>,
    pub tokens: Arc<dyn TokenService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub like_limiter: Arc<dyn RateLimiter>,
    pub users: Arc<dyn UserRepository>,
    pub lifecycle: Arc<PostLifecycle>,
    pub likes: Arc<LikeService>,
    pub accounts: Arc<AccountService>,
    pub db: Option<Arc<DatabaseConnections>>,
    pub secure_cookies: bool,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let policy = Arc::new(config.access_policy());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(OAuthIdentityProvider::new(config.oauth.clone())?);
        let like_limiter: Arc<dyn RateLimiter> =
            Arc::new(InMemoryRateLimiter::new(config.like_rate_limit.clone())?);

        let (db, stores) = connect(config.database.as_ref()).await;

        let mut state = Self::assemble(stores, policy, tokens, identity, like_limiter, db);
        state.secure_cookies = config.secure_cookies;

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Wire services over `stores`.
    pub fn assemble(
        stores: Stores,
        policy: Arc<AccessPolicy>,
        tokens: Arc<dyn TokenService>,
        identity: Arc<dyn IdentityProvider>,
        like_limiter: Arc<dyn RateLimiter>,
        db: Option<Arc<DatabaseConnections>>,
    ) -> Self {
        Self {
            lifecycle: Arc::new(PostLifecycle::new(stores.posts.clone(), policy.clone())),
            likes: Arc::new(LikeService::new(stores.posts, stores.likes)),
            accounts: Arc::new(AccountService::new(stores.users.clone(), policy.clone())),
            users: stores.users,
            policy,
            tokens,
            identity,
            like_limiter,
            db,
            secure_cookies: false,
        }
    }
}

#[cfg(feature = "postgres")]
async fn connect(config: Option<&DatabaseConfig>) -> (Option<Arc<DatabaseConnections>>, Stores) {
    let Some(config) = config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return (None, Stores::in_memory());
    };

    match DatabaseConnections::init(config).await {
        Ok(connections) => {
            let stores = Stores::postgres(&connections);
            (Some(Arc::new(connections)), stores)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            (None, Stores::in_memory())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn connect(_config: Option<&DatabaseConfig>) -> (Option<Arc<DatabaseConnections>>, Stores) {
    tracing::info!("Running without postgres feature - using in-memory store");
    (None, Stores::in_memory())
}
