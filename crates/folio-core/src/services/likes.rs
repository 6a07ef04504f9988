use std::sync::Arc;

use crate::domain::{Like, LikeStatus, LikeToggle, Post, PostRef};
use crate::error::DomainError;
use crate::fingerprint::ClientSignature;
use crate::ports::{LikeRepository, PostRepository};

use super::resolve_post;

/// Anonymous like counter for live posts.
pub struct LikeService {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl LikeService {
    pub fn new(posts: Arc<dyn PostRepository>, likes: Arc<dyn LikeRepository>) -> Self {
        Self { posts, likes }
    }

    pub async fn status(
        &self,
        post_ref: &PostRef,
        client: &ClientSignature,
    ) -> Result<LikeStatus, DomainError> {
        let post = self.live_post(post_ref).await?;
        let is_liked = self.likes.exists(post.id, &client.fingerprint()).await?;

        Ok(LikeStatus {
            likes_count: post.likes_count,
            is_liked,
        })
    }

    pub async fn toggle(
        &self,
        post_ref: &PostRef,
        client: &ClientSignature,
    ) -> Result<LikeToggle, DomainError> {
        let post = self.live_post(post_ref).await?;
        let like = Like::new(
            post.id,
            client.fingerprint(),
            client.ip_address(),
            client.user_agent.clone(),
        );

        let outcome = self.likes.toggle(like).await?;
        tracing::debug!(
            post_id = %post.id,
            action = ?outcome.action,
            likes_count = outcome.likes_count,
            "Like toggled"
        );
        Ok(outcome)
    }

    async fn live_post(&self, post_ref: &PostRef) -> Result<Post, DomainError> {
        let post = resolve_post(self.posts.as_ref(), post_ref).await?;
        if !post.is_live() {
            return Err(DomainError::Forbidden(
                "likes are only available on published posts".to_string(),
            ));
        }
        Ok(post)
    }
}
