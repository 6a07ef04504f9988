//! Post like entity for SeaORM. One row per (post, fingerprint).

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::fingerprint::Fingerprint;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_likes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub post_id: Uuid,
    pub fingerprint: String,
    pub ip_address: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for folio_core::domain::Like {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            fingerprint: Fingerprint::from_stored(model.fingerprint),
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            created_at: model.created_at.into(),
        }
    }
}

impl From<folio_core::domain::Like> for ActiveModel {
    fn from(like: folio_core::domain::Like) -> Self {
        Self {
            id: Set(like.id),
            post_id: Set(like.post_id),
            fingerprint: Set(like.fingerprint.as_str().to_string()),
            ip_address: Set(like.ip_address),
            user_agent: Set(like.user_agent),
            created_at: Set(like.created_at.into()),
        }
    }
}
