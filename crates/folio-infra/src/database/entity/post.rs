//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{FromJsonQueryResult, Set};
use serde::{Deserialize, Serialize};

use folio_core::domain::{ContentSection, PostStatus, PostType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Status {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Draft => PostStatus::Draft,
            Status::Pending => PostStatus::Pending,
            Status::Approved => PostStatus::Approved,
            Status::Rejected => PostStatus::Rejected,
        }
    }
}

impl From<PostStatus> for Status {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => Status::Draft,
            PostStatus::Pending => Status::Pending,
            PostStatus::Approved => Status::Approved,
            PostStatus::Rejected => Status::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Kind {
    #[sea_orm(string_value = "BLOG")]
    Blog,
    #[sea_orm(string_value = "INSTAGRAM")]
    Instagram,
    #[sea_orm(string_value = "VLOG")]
    Vlog,
}

impl From<Kind> for PostType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Blog => PostType::Blog,
            Kind::Instagram => PostType::Instagram,
            Kind::Vlog => PostType::Vlog,
        }
    }
}

impl From<PostType> for Kind {
    fn from(post_type: PostType) -> Self {
        match post_type {
            PostType::Blog => Kind::Blog,
            PostType::Instagram => Kind::Instagram,
            PostType::Vlog => Kind::Vlog,
        }
    }
}

/// Ordered content blocks, stored as one JSONB array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Sections(pub Vec<ContentSection>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub post_type: Kind,
    #[sea_orm(column_type = "JsonBinary")]
    pub sections: Sections,
    pub status: Status,
    pub published: bool,
    pub likes_count: i64,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    pub reviewed_by_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub review_comments: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::post_like::Entity")]
    Like,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Like.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for folio_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            slug: model.slug,
            post_type: model.post_type.into(),
            sections: model.sections.0,
            status: model.status.into(),
            published: model.published,
            likes_count: model.likes_count,
            reviewed_at: model.reviewed_at.map(Into::into),
            reviewed_by_id: model.reviewed_by_id,
            review_comments: model.review_comments,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
///
/// `likes_count` is left unset; only the like toggle writes it.
impl From<folio_core::domain::Post> for ActiveModel {
    fn from(post: folio_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            slug: Set(post.slug),
            post_type: Set(post.post_type.into()),
            sections: Set(Sections(post.sections)),
            status: Set(post.status.into()),
            published: Set(post.published),
            likes_count: sea_orm::ActiveValue::NotSet,
            reviewed_at: Set(post.reviewed_at.map(Into::into)),
            reviewed_by_id: Set(post.reviewed_by_id),
            review_comments: Set(post.review_comments),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
