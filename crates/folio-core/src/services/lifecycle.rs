//! Post review workflow.
//!
//! ```text
//! create ──► DRAFT ──submit──► PENDING ──approve──► APPROVED (published)
//!              ▲                  │
//!              │   request-changes│            reject ──► (deleted)
//!              └── DRAFT+feedback ◄┘
//!                      │ resubmit
//!                      └──────────► PENDING
//! ```

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::access::{AccessPolicy, Session};
use crate::domain::{ModerationPatch, NewPost, Post, PostRef, PostRevision, ReviewStats};
use crate::error::DomainError;
use crate::ports::PostRepository;

use super::resolve_post;

pub struct PostLifecycle {
    posts: Arc<dyn PostRepository>,
    policy: Arc<AccessPolicy>,
}

impl PostLifecycle {
    pub fn new(posts: Arc<dyn PostRepository>, policy: Arc<AccessPolicy>) -> Self {
        Self { posts, policy }
    }

    pub async fn get(&self, post_ref: &PostRef) -> Result<Post, DomainError> {
        resolve_post(self.posts.as_ref(), post_ref).await
    }

    pub async fn published(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_published().await?)
    }

    pub async fn authored_by(&self, session: &Session) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_author(session.user_id).await?)
    }

    pub async fn create(&self, session: &Session, draft: NewPost) -> Result<Post, DomainError> {
        let post = Post::new(session.user_id, draft)?;
        self.ensure_slug_free(&post.slug, None).await?;

        let post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, author_id = %session.user_id, "Draft created");
        Ok(post)
    }

    pub async fn submit(&self, session: &Session, post_ref: &PostRef) -> Result<Post, DomainError> {
        let mut post = self.get(post_ref).await?;
        self.ensure_owner(session, &post)?;

        post.submit(Utc::now())?;
        let post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, "Post submitted for review");
        Ok(post)
    }

    pub async fn approve(&self, session: &Session, post_ref: &PostRef) -> Result<Post, DomainError> {
        self.ensure_reviewer(session)?;
        let mut post = self.get(post_ref).await?;

        post.approve(session.user_id, Utc::now())?;
        let post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, reviewer_id = %session.user_id, "Post approved");
        Ok(post)
    }

    pub async fn request_changes(
        &self,
        session: &Session,
        post_ref: &PostRef,
        feedback: &str,
    ) -> Result<Post, DomainError> {
        self.ensure_reviewer(session)?;
        if feedback.trim().is_empty() {
            return Err(DomainError::Validation("feedback is required".to_string()));
        }
        let mut post = self.get(post_ref).await?;

        post.request_changes(session.user_id, feedback, Utc::now())?;
        let post = self.posts.save(post).await?;
        tracing::info!(
            post_id = %post.id,
            reviewer_id = %session.user_id,
            "Changes requested"
        );
        Ok(post)
    }

    /// Reject a pending post. The post is deleted; this log line is the only
    /// record of the decision.
    pub async fn reject(
        &self,
        session: &Session,
        post_ref: &PostRef,
        reason: &str,
    ) -> Result<Post, DomainError> {
        self.ensure_reviewer(session)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::Validation("reason is required".to_string()));
        }
        let post = self.get(post_ref).await?;
        post.ensure_pending("reject")?;

        self.posts.delete(post.id).await?;
        tracing::info!(
            post_id = %post.id,
            slug = %post.slug,
            author_id = %post.author_id,
            reviewer_id = %session.user_id,
            reason = %reason,
            "Post rejected and deleted"
        );
        Ok(post)
    }

    /// Author edit of a post returned with feedback.
    pub async fn resubmit(
        &self,
        session: &Session,
        post_ref: &PostRef,
        revision: PostRevision,
    ) -> Result<Post, DomainError> {
        let current = self.get(post_ref).await?;
        self.ensure_owner(session, &current)?;

        let mut revised = current.clone();
        revised.resubmit(revision, Utc::now())?;
        self.ensure_slug_free(&revised.slug, Some(current.id)).await?;

        let post = self.posts.save(revised).await?;
        tracing::info!(post_id = %post.id, status = %post.status, "Post revised by author");
        Ok(post)
    }

    pub async fn moderate(
        &self,
        session: &Session,
        post_ref: &PostRef,
        patch: ModerationPatch,
    ) -> Result<Post, DomainError> {
        self.ensure_moderator(session)?;
        let current = self.get(post_ref).await?;

        let mut updated = current.clone();
        updated.moderate(patch, Utc::now())?;
        if updated.slug != current.slug {
            self.ensure_slug_free(&updated.slug, Some(current.id)).await?;
        }

        let post = self.posts.save(updated).await?;
        tracing::info!(post_id = %post.id, moderator_id = %session.user_id, "Post updated by moderator");
        Ok(post)
    }

    pub async fn delete(&self, session: &Session, post_ref: &PostRef) -> Result<(), DomainError> {
        self.ensure_moderator(session)?;
        let post = self.get(post_ref).await?;

        self.posts.delete(post.id).await?;
        tracing::info!(
            post_id = %post.id,
            status = %post.status,
            moderator_id = %session.user_id,
            "Post deleted by moderator"
        );
        Ok(())
    }

    pub async fn pending_queue(&self, session: &Session) -> Result<Vec<Post>, DomainError> {
        self.ensure_reviewer(session)?;
        Ok(self.posts.find_pending_oldest_first().await?)
    }

    pub async fn stats(&self, session: &Session) -> Result<ReviewStats, DomainError> {
        self.ensure_reviewer(session)?;
        Ok(self.posts.review_stats().await?)
    }

    fn ensure_reviewer(&self, session: &Session) -> Result<(), DomainError> {
        if !self.policy.is_reviewer(Some(session)) {
            return Err(DomainError::Unauthorized("reviewer role required".to_string()));
        }
        Ok(())
    }

    fn ensure_moderator(&self, session: &Session) -> Result<(), DomainError> {
        if !self.policy.can_moderate(Some(session)) {
            return Err(DomainError::Forbidden("moderator access required".to_string()));
        }
        Ok(())
    }

    fn ensure_owner(&self, session: &Session, post: &Post) -> Result<(), DomainError> {
        if !self.policy.can_edit(Some(session), post) {
            return Err(DomainError::Forbidden(
                "only the author may edit this post".to_string(),
            ));
        }
        Ok(())
    }

    async fn ensure_slug_free(
        &self,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), DomainError> {
        if self.posts.slug_taken(slug, exclude).await? {
            return Err(DomainError::Conflict(format!("slug '{slug}' is already in use")));
        }
        Ok(())
    }
}
