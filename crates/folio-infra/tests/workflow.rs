//! End-to-end review and like workflows over the in-memory store.

use std::sync::Arc;

use folio_core::access::{AccessPolicy, Session};
use folio_core::domain::{
    ContentSection, LikeAction, NewPost, PostRef, PostRevision, PostStatus, PostType, Role,
};
use folio_core::error::DomainError;
use folio_core::fingerprint::ClientSignature;
use folio_core::ports::{BaseRepository, ExternalProfile, PostRepository, UserRepository};
use folio_core::services::{AccountService, LikeService, PostLifecycle};
use folio_infra::InMemoryStore;

const ALLOWED: &str = "ana@example.com,ben@example.com,rev@example.com,rita@example.com";
const REVIEWERS: &str = "rev@example.com,rita@example.com";

struct Harness {
    store: InMemoryStore,
    lifecycle: PostLifecycle,
    likes: LikeService,
    accounts: AccountService,
}

impl Harness {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let policy = Arc::new(AccessPolicy::from_lists(ALLOWED, REVIEWERS));
        let posts: Arc<dyn PostRepository> = Arc::new(store.clone());
        let users: Arc<dyn UserRepository> = Arc::new(store.clone());

        Self {
            lifecycle: PostLifecycle::new(posts.clone(), policy.clone()),
            likes: LikeService::new(posts, Arc::new(store.clone())),
            accounts: AccountService::new(users, policy),
            store,
        }
    }

    async fn sign_in(&self, email: &str) -> Session {
        let user = self
            .accounts
            .sign_in(ExternalProfile {
                email: email.to_string(),
                name: None,
                email_verified: true,
            })
            .await
            .unwrap();

        Session {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }

    async fn pending_post(&self, author: &Session, slug: &str) -> PostRef {
        let post = self
            .lifecycle
            .create(
                author,
                NewPost {
                    title: "Trip notes".to_string(),
                    slug: slug.to_string(),
                    post_type: PostType::Blog,
                    sections: vec![ContentSection::Heading {
                        text: "Day one".to_string(),
                    }],
                },
            )
            .await
            .unwrap();
        let post_ref = PostRef::Id(post.id);
        self.lifecycle.submit(author, &post_ref).await.unwrap();
        post_ref
    }
}

fn browser(ua: &str) -> ClientSignature {
    ClientSignature {
        user_agent: Some(ua.to_string()),
        accept_language: Some("en-US".to_string()),
        accept_encoding: Some("gzip".to_string()),
        forwarded_for: Some("198.51.100.4, 10.0.0.1".to_string()),
        ..ClientSignature::default()
    }
}

#[tokio::test]
async fn test_feedback_loop_then_approval() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    let reviewer = h.sign_in("rev@example.com").await;
    let post_ref = h.pending_post(&author, "trip-notes").await;

    let returned = h
        .lifecycle
        .request_changes(&reviewer, &post_ref, "add photos")
        .await
        .unwrap();
    assert_eq!(returned.status, PostStatus::Draft);
    assert_eq!(returned.review_comments.as_deref(), Some("add photos"));
    assert_eq!(h.lifecycle.stats(&reviewer).await.unwrap().needs_update, 1);

    let revised = h
        .lifecycle
        .resubmit(
            &author,
            &post_ref,
            PostRevision {
                title: "Trip notes, with photos".to_string(),
                slug: "trip-notes".to_string(),
                post_type: None,
                sections: None,
                submit: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(revised.status, PostStatus::Pending);
    assert!(revised.review_comments.is_none());

    let approved = h.lifecycle.approve(&reviewer, &post_ref).await.unwrap();
    assert!(approved.is_live());
    assert_eq!(approved.reviewed_by_id, Some(reviewer.user_id));

    let published = h.lifecycle.published().await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].slug, "trip-notes");
}

#[tokio::test]
async fn test_reject_deletes_post() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    let reviewer = h.sign_in("rev@example.com").await;
    let post_ref = h.pending_post(&author, "spam").await;

    let rejected = h
        .lifecycle
        .reject(&reviewer, &post_ref, "off-topic")
        .await
        .unwrap();

    let lookup = h.lifecycle.get(&post_ref).await;
    assert!(matches!(lookup, Err(DomainError::NotFound { .. })));
    assert!(
        BaseRepository::<folio_core::domain::Post, uuid::Uuid>::find_by_id(&h.store, rejected.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_reject_requires_reason_and_pending_state() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    let reviewer = h.sign_in("rev@example.com").await;
    let post_ref = h.pending_post(&author, "keep-me").await;

    let blank = h.lifecycle.reject(&reviewer, &post_ref, "  ").await;
    assert!(matches!(blank, Err(DomainError::Validation(_))));

    h.lifecycle.approve(&reviewer, &post_ref).await.unwrap();
    let late = h.lifecycle.reject(&reviewer, &post_ref, "changed my mind").await;
    assert!(matches!(late, Err(DomainError::InvalidState(_))));
    assert!(h.lifecycle.get(&post_ref).await.is_ok());
}

#[tokio::test]
async fn test_uploader_cannot_review() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    let other = h.sign_in("ben@example.com").await;
    let post_ref = h.pending_post(&author, "not-yours").await;

    let result = h.lifecycle.approve(&other, &post_ref).await;
    assert!(matches!(result, Err(DomainError::Unauthorized(_))));

    let queue = h.lifecycle.pending_queue(&other).await;
    assert!(matches!(queue, Err(DomainError::Unauthorized(_))));
}

#[tokio::test]
async fn test_reviewer_cannot_approve_own_post() {
    let h = Harness::new();
    let reviewer = h.sign_in("rev@example.com").await;
    let post_ref = h.pending_post(&reviewer, "self-review").await;

    let own = h.lifecycle.approve(&reviewer, &post_ref).await;
    assert!(matches!(own, Err(DomainError::Forbidden(_))));

    let colleague = h.sign_in("rita@example.com").await;
    assert!(h.lifecycle.approve(&colleague, &post_ref).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_slug_is_conflict() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    h.pending_post(&author, "taken").await;

    let result = h
        .lifecycle
        .create(
            &author,
            NewPost {
                title: "Again".to_string(),
                slug: "Taken".to_string(),
                post_type: PostType::Vlog,
                sections: vec![],
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn test_pending_queue_is_oldest_first() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    let reviewer = h.sign_in("rev@example.com").await;
    h.pending_post(&author, "first").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    h.pending_post(&author, "second").await;

    let queue = h.lifecycle.pending_queue(&reviewer).await.unwrap();
    let slugs: Vec<&str> = queue.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["first", "second"]);
}

#[tokio::test]
async fn test_like_toggle_is_its_own_inverse() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    let reviewer = h.sign_in("rev@example.com").await;
    let post_ref = h.pending_post(&author, "liked").await;
    h.lifecycle.approve(&reviewer, &post_ref).await.unwrap();

    let alice = browser("Firefox");
    let bob = browser("Safari");

    let first = h.likes.toggle(&post_ref, &alice).await.unwrap();
    assert_eq!(first.action, LikeAction::Liked);
    assert_eq!(first.likes_count, 1);

    let second = h.likes.toggle(&post_ref, &bob).await.unwrap();
    assert_eq!(second.likes_count, 2);

    let status = h.likes.status(&post_ref, &alice).await.unwrap();
    assert!(status.is_liked);
    assert_eq!(status.likes_count, 2);

    let undo = h.likes.toggle(&post_ref, &alice).await.unwrap();
    assert_eq!(undo.action, LikeAction::Unliked);
    assert_eq!(undo.likes_count, 1);
    assert!(!h.likes.status(&post_ref, &alice).await.unwrap().is_liked);
    assert!(h.likes.status(&post_ref, &bob).await.unwrap().is_liked);
}

#[tokio::test]
async fn test_like_counter_tracks_rows_through_mixed_toggles() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    let reviewer = h.sign_in("rev@example.com").await;
    let post_ref = h.pending_post(&author, "counted").await;
    h.lifecycle.approve(&reviewer, &post_ref).await.unwrap();
    let post_id = h.lifecycle.get(&post_ref).await.unwrap().id;

    let clients = [browser("Firefox"), browser("Safari"), browser("Chrome")];
    // Indexes into `clients`, interleaving likes and unlikes.
    let sequence = [0, 1, 0, 2, 1, 1, 2, 0, 2, 2, 0];

    for (step, &who) in sequence.iter().enumerate() {
        let outcome = h.likes.toggle(&post_ref, &clients[who]).await.unwrap();
        let rows = h.store.like_rows(post_id).await;
        let stored = h.lifecycle.get(&post_ref).await.unwrap().likes_count;

        assert_eq!(outcome.likes_count, rows, "step {step}");
        assert_eq!(stored, rows, "step {step}");
    }

    // Firefox toggled 4 times, Safari 3, Chrome 4.
    assert_eq!(h.store.like_rows(post_id).await, 1);
    assert!(h.likes.status(&post_ref, &clients[1]).await.unwrap().is_liked);
    assert!(!h.likes.status(&post_ref, &clients[0]).await.unwrap().is_liked);
}

#[tokio::test]
async fn test_likes_refused_on_unpublished_post() {
    let h = Harness::new();
    let author = h.sign_in("ana@example.com").await;
    let post_ref = h.pending_post(&author, "draft-like").await;
    let post_id = h.lifecycle.get(&post_ref).await.unwrap().id;

    let result = h.likes.toggle(&post_ref, &browser("Firefox")).await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));
    assert_eq!(h.store.like_rows(post_id).await, 0);
    assert_eq!(h.lifecycle.get(&post_ref).await.unwrap().likes_count, 0);

    let missing = h
        .likes
        .status(&PostRef::parse("no-such-post"), &browser("Firefox"))
        .await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_sign_in_refuses_unlisted_email() {
    let h = Harness::new();

    let result = h
        .accounts
        .sign_in(ExternalProfile {
            email: "stranger@example.com".to_string(),
            name: None,
            email_verified: true,
        })
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
    assert!(h.store.find_by_email("stranger@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sign_in_repairs_stale_role() {
    let h = Harness::new();
    let session = h.sign_in("rev@example.com").await;

    let mut stale = h.store.find_by_email("rev@example.com").await.unwrap().unwrap();
    stale.role = Role::Uploader;
    BaseRepository::<folio_core::domain::User, uuid::Uuid>::save(&h.store, stale)
        .await
        .unwrap();

    let again = h.sign_in("REV@example.com").await;
    assert_eq!(again.user_id, session.user_id);
    assert_eq!(again.role, Role::Reviewer);
}
