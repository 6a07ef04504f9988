use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Like, LikeToggle, Post, ReviewStats, User};
use crate::error::RepoError;
use crate::fingerprint::Fingerprint;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (lower-cased) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// An author's posts, newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Approved and published posts, newest first.
    async fn find_published(&self) -> Result<Vec<Post>, RepoError>;

    /// The review queue, oldest submission first.
    async fn find_pending_oldest_first(&self) -> Result<Vec<Post>, RepoError>;

    /// Whether `slug` belongs to any post other than `exclude`.
    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError>;

    async fn review_stats(&self) -> Result<ReviewStats, RepoError>;
}

/// Like storage. Implementations must apply the row change and the post's
/// counter change as one atomic unit.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn exists(&self, post_id: Uuid, fingerprint: &Fingerprint) -> Result<bool, RepoError>;

    /// Remove the like for `(like.post_id, like.fingerprint)` if present,
    /// otherwise insert `like`; adjust `likes_count` by one accordingly.
    async fn toggle(&self, like: Like) -> Result<LikeToggle, RepoError>;
}
