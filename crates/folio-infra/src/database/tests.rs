use std::collections::BTreeMap;

use crate::database::entity::post::{self, Kind, Sections, Status};
use crate::database::entity::post_like;
use crate::database::postgres_base::db_err;
use crate::database::postgres_repo::{PostgresLikeRepository, PostgresPostRepository};
use folio_core::domain::{ContentSection, Like, LikeAction, Post, PostStatus, PostType};
use folio_core::error::RepoError;
use folio_core::fingerprint::Fingerprint;
use folio_core::ports::{BaseRepository, LikeRepository, PostRepository};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

fn post_model(id: Uuid, slug: &str, status: Status, published: bool) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        title: "Test Post".to_owned(),
        slug: slug.to_owned(),
        post_type: Kind::Vlog,
        sections: Sections(vec![ContentSection::Video {
            url: "https://cdn.example.com/v.mp4".to_owned(),
        }]),
        status,
        published,
        likes_count: 3,
        reviewed_at: None,
        reviewed_by_id: None,
        review_comments: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(
            post_id,
            "test-post",
            Status::Pending,
            false,
        )]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.status, PostStatus::Pending);
    assert_eq!(post.post_type, PostType::Vlog);
    assert_eq!(post.likes_count, 3);
    assert_eq!(post.sections.len(), 1);
}

#[tokio::test]
async fn test_find_by_slug_returns_none_when_missing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.find_by_slug("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_published_maps_every_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_model(Uuid::new_v4(), "newer", Status::Approved, true),
            post_model(Uuid::new_v4(), "older", Status::Approved, true),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = repo.find_published().await.unwrap();

    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(Post::is_live));
    assert_eq!(posts[0].slug, "newer");
}

fn like_model(post_id: Uuid, fingerprint: &str) -> post_like::Model {
    post_like::Model {
        id: Uuid::new_v4(),
        post_id,
        fingerprint: fingerprint.to_owned(),
        ip_address: "203.0.113.7".to_owned(),
        user_agent: Some("Mozilla/5.0".to_owned()),
        created_at: chrono::Utc::now().into(),
    }
}

fn likes_count_row(count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("likes_count", Value::from(count))])
}

fn like_for(post_id: Uuid, fingerprint: &str) -> Like {
    Like::new(
        post_id,
        Fingerprint::from_stored(fingerprint.to_owned()),
        "203.0.113.7".to_owned(),
        Some("Mozilla/5.0".to_owned()),
    )
}

#[tokio::test]
async fn test_unlike_decrements_when_row_deleted() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![like_model(post_id, "fp-1")]])
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .append_query_results(vec![vec![likes_count_row(2)]])
        .into_connection();

    let repo = PostgresLikeRepository::new(db);
    let outcome = repo.toggle(like_for(post_id, "fp-1")).await.unwrap();

    assert_eq!(outcome.action, LikeAction::Unliked);
    assert!(!outcome.is_liked);
    assert_eq!(outcome.likes_count, 2);
}

#[tokio::test]
async fn test_unlike_of_vanished_row_leaves_counter_alone() {
    // Another transaction deleted the row between our SELECT and DELETE.
    // Only one exec result is queued: a counter UPDATE would exhaust the
    // mock and fail the toggle.
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![like_model(post_id, "fp-1")]])
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .append_query_results(vec![vec![likes_count_row(3)]])
        .into_connection();

    let repo = PostgresLikeRepository::new(db);
    let outcome = repo.toggle(like_for(post_id, "fp-1")).await.unwrap();

    assert_eq!(outcome.action, LikeAction::Unliked);
    assert!(!outcome.is_liked);
    assert_eq!(outcome.likes_count, 3);
}

#[test]
fn test_db_err_mapping() {
    assert!(matches!(
        db_err(DbErr::RecordNotFound("posts".to_owned())),
        RepoError::NotFound
    ));
    assert!(matches!(
        db_err(DbErr::Custom("boom".to_owned())),
        RepoError::Query(_)
    ));
}
