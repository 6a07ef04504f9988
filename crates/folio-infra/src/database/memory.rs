//! In-memory persistence for development and tests.
//!
//! Mirrors the Postgres schema's guarantees: unique emails and slugs,
//! one like per `(post, fingerprint)`, likes cascading with their post.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Like, LikeToggle, Post, PostStatus, ReviewStats, User};
use folio_core::error::RepoError;
use folio_core::fingerprint::Fingerprint;
use folio_core::ports::{BaseRepository, LikeRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    likes: HashMap<(Uuid, String), Like>,
}

/// Shared in-memory store. Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored like rows for `post_id`, independent of the post's
    /// cached `likes_count`.
    pub async fn like_rows(&self, post_id: Uuid) -> i64 {
        let tables = self.tables.read().await;
        tables.likes.keys().filter(|(id, _)| *id == post_id).count() as i64
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email);
        if duplicate {
            return Err(RepoError::Constraint(format!(
                "email already registered: {}",
                user.email
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.posts.remove(&post_id);
            tables.likes.retain(|(liked, _), _| *liked != post_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    /// The stored `likes_count` wins over the incoming one.
    async fn save(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .posts
            .values()
            .any(|p| p.id != post.id && p.slug == post.slug);
        if duplicate {
            return Err(RepoError::Constraint(format!(
                "slug already in use: {}",
                post.slug
            )));
        }
        if !tables.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "unknown author {}",
                post.author_id
            )));
        }
        post.likes_count = tables
            .posts
            .get(&post.id)
            .map(|existing| existing.likes_count)
            .unwrap_or(0);
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
        tables.likes.retain(|(post_id, _), _| *post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let posts = tables
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        Ok(newest_first(posts))
    }

    async fn find_published(&self) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let posts = tables.posts.values().filter(|p| p.is_live()).cloned().collect();
        Ok(newest_first(posts))
    }

    async fn find_pending_oldest_first(&self) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.status == PostStatus::Pending)
            .cloned()
            .collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(posts)
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .any(|p| p.slug == slug && Some(p.id) != exclude))
    }

    async fn review_stats(&self) -> Result<ReviewStats, RepoError> {
        let tables = self.tables.read().await;
        let mut stats = ReviewStats::default();
        for post in tables.posts.values() {
            stats.record(post.bucket());
        }
        Ok(stats)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn exists(&self, post_id: Uuid, fingerprint: &Fingerprint) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .contains_key(&(post_id, fingerprint.as_str().to_string())))
    }

    async fn toggle(&self, like: Like) -> Result<LikeToggle, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&like.post_id) {
            return Err(RepoError::NotFound);
        }

        let post_id = like.post_id;
        let key = (post_id, like.fingerprint.as_str().to_string());
        let liked = if tables.likes.remove(&key).is_some() {
            false
        } else {
            tables.likes.insert(key, like);
            true
        };

        let post = tables.posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.likes_count = if liked {
            post.likes_count + 1
        } else {
            (post.likes_count - 1).max(0)
        };

        Ok(if liked {
            LikeToggle::liked(post.likes_count)
        } else {
            LikeToggle::unliked(post.likes_count)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::{NewPost, PostType, Role};

    async fn seed_post(store: &InMemoryStore, slug: &str) -> Post {
        let author = User::new("author@example.com", None, Role::Uploader);
        let author = match store.find_by_email(&author.email).await.unwrap() {
            Some(existing) => existing,
            None => BaseRepository::<User, Uuid>::save(store, author).await.unwrap(),
        };
        let post = Post::new(
            author.id,
            NewPost {
                title: "Hello".to_string(),
                slug: slug.to_string(),
                post_type: PostType::Blog,
                sections: vec![],
            },
        )
        .unwrap();
        BaseRepository::<Post, Uuid>::save(store, post).await.unwrap()
    }

    fn like_for(post_id: Uuid, fingerprint: &str) -> Like {
        Like::new(
            post_id,
            Fingerprint::from_stored(fingerprint.to_string()),
            "203.0.113.7".to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_error() {
        let store = InMemoryStore::new();
        BaseRepository::<User, Uuid>::save(&store, User::new("a@x.io", None, Role::Uploader))
            .await
            .unwrap();

        let result =
            BaseRepository::<User, Uuid>::save(&store, User::new("A@x.io", None, Role::Reviewer))
                .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_constraint_error() {
        let store = InMemoryStore::new();
        let first = seed_post(&store, "same").await;

        let mut second = first.clone();
        second.id = Uuid::new_v4();
        let result = BaseRepository::<Post, Uuid>::save(&store, second).await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
        assert!(store.slug_taken("same", None).await.unwrap());
        assert!(!store.slug_taken("same", Some(first.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let store = InMemoryStore::new();
        let post = seed_post(&store, "likes").await;

        let first = store.toggle(like_for(post.id, "fp-1")).await.unwrap();
        assert_eq!(first, LikeToggle::liked(1));
        let fingerprint = Fingerprint::from_stored("fp-1".to_string());
        assert!(store.exists(post.id, &fingerprint).await.unwrap());

        let second = store.toggle(like_for(post.id, "fp-1")).await.unwrap();
        assert_eq!(second, LikeToggle::unliked(0));
        assert_eq!(store.like_rows(post.id).await, 0);
    }

    #[tokio::test]
    async fn test_save_does_not_overwrite_like_counter() {
        let store = InMemoryStore::new();
        let post = seed_post(&store, "counter").await;
        store.toggle(like_for(post.id, "fp-1")).await.unwrap();
        store.toggle(like_for(post.id, "fp-2")).await.unwrap();

        let mut stale = post.clone();
        stale.title = "Renamed".to_string();
        let saved = BaseRepository::<Post, Uuid>::save(&store, stale).await.unwrap();

        assert_eq!(saved.likes_count, 2);
        assert_eq!(store.like_rows(post.id).await, 2);
    }

    #[tokio::test]
    async fn test_deleting_post_removes_its_likes() {
        let store = InMemoryStore::new();
        let post = seed_post(&store, "gone").await;
        store.toggle(like_for(post.id, "fp-1")).await.unwrap();

        BaseRepository::<Post, Uuid>::delete(&store, post.id)
            .await
            .unwrap();

        assert_eq!(store.like_rows(post.id).await, 0);
        assert!(matches!(
            store.toggle(like_for(post.id, "fp-1")).await,
            Err(RepoError::NotFound)
        ));
    }
}
