//! Application services - the workflows handlers call into.

mod accounts;
mod lifecycle;
mod likes;

pub use accounts::AccountService;
pub use lifecycle::PostLifecycle;
pub use likes::LikeService;

use crate::domain::{Post, PostRef};
use crate::error::DomainError;
use crate::ports::PostRepository;

/// Load a post by id or slug. A UUID-shaped parameter that matches no id is
/// retried as a slug.
pub async fn resolve_post(
    posts: &dyn PostRepository,
    post_ref: &PostRef,
) -> Result<Post, DomainError> {
    let found = match post_ref {
        PostRef::Id(id) => match posts.find_by_id(*id).await? {
            Some(post) => Some(post),
            None => posts.find_by_slug(&id.to_string()).await?,
        },
        PostRef::Slug(slug) => posts.find_by_slug(slug).await?,
    };

    found.ok_or_else(|| DomainError::post_not_found(post_ref.to_string()))
}
