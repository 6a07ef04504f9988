//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use folio_core::access::mask_email;
use folio_core::domain::{Like, LikeToggle, Post, ReviewStats, User};
use folio_core::error::RepoError;
use folio_core::fingerprint::Fingerprint;
use folio_core::ports::{LikeRepository, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity, Status};
use super::entity::post_like::{self, Entity as LikeEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_published(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Status.eq(Status::Approved))
            .filter(post::Column::Published.eq(true))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_pending_oldest_first(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Status.eq(Status::Pending))
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        let mut query = PostEntity::find().filter(post::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            query = query.filter(post::Column::Id.ne(id));
        }

        let count = query.count(&self.db).await.map_err(db_err)?;
        Ok(count > 0)
    }

    async fn review_stats(&self) -> Result<ReviewStats, RepoError> {
        let count_status = |status: Status| {
            PostEntity::find()
                .filter(post::Column::Status.eq(status))
                .count(&self.db)
        };

        let pending = count_status(Status::Pending).await.map_err(db_err)?;
        let approved = count_status(Status::Approved).await.map_err(db_err)?;
        let rejected = count_status(Status::Rejected).await.map_err(db_err)?;
        let needs_update = PostEntity::find()
            .filter(post::Column::Status.eq(Status::Draft))
            .filter(post::Column::ReviewComments.is_not_null())
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(ReviewStats {
            pending,
            approved,
            rejected,
            needs_update,
        })
    }
}

/// PostgreSQL like repository. Toggles run in a single transaction.
pub struct PostgresLikeRepository {
    db: DbConn,
}

impl PostgresLikeRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn exists(&self, post_id: Uuid, fingerprint: &Fingerprint) -> Result<bool, RepoError> {
        let count = LikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::Fingerprint.eq(fingerprint.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(count > 0)
    }

    async fn toggle(&self, like: Like) -> Result<LikeToggle, RepoError> {
        let post_id = like.post_id;
        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = LikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::Fingerprint.eq(like.fingerprint.as_str()))
            .one(&txn)
            .await
            .map_err(db_err)?;

        let liked = match existing {
            Some(row) => {
                let deleted = LikeEntity::delete_by_id(row.id)
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
                // A concurrent unlike already removed the row and its count.
                if deleted.rows_affected == 1 {
                    PostEntity::update_many()
                        .col_expr(
                            post::Column::LikesCount,
                            Expr::col(post::Column::LikesCount).sub(1),
                        )
                        .filter(post::Column::Id.eq(post_id))
                        .filter(post::Column::LikesCount.gt(0))
                        .exec(&txn)
                        .await
                        .map_err(db_err)?;
                }
                false
            }
            None => {
                post_like::ActiveModel::from(like)
                    .insert(&txn)
                    .await
                    .map_err(db_err)?;
                PostEntity::update_many()
                    .col_expr(
                        post::Column::LikesCount,
                        Expr::col(post::Column::LikesCount).add(1),
                    )
                    .filter(post::Column::Id.eq(post_id))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
                true
            }
        };

        let likes_count = PostEntity::find_by_id(post_id)
            .select_only()
            .column(post::Column::LikesCount)
            .into_tuple::<i64>()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?;

        txn.commit().await.map_err(db_err)?;

        Ok(if liked {
            LikeToggle::liked(likes_count)
        } else {
            LikeToggle::unliked(likes_count)
        })
    }
}
