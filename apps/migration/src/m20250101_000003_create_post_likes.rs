use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostLikes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PostLikes::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostLikes::Fingerprint).string_len(64).not_null())
                    .col(ColumnDef::new(PostLikes::IpAddress).text().not_null())
                    .col(ColumnDef::new(PostLikes::UserAgent).text().null())
                    .col(
                        ColumnDef::new(PostLikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_likes_post")
                            .from(PostLikes::Table, PostLikes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One like per client per post
        manager
            .create_index(
                Index::create()
                    .name("idx_post_likes_post_fingerprint")
                    .table(PostLikes::Table)
                    .col(PostLikes::PostId)
                    .col(PostLikes::Fingerprint)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostLikes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostLikes {
    Table,
    Id,
    PostId,
    Fingerprint,
    IpAddress,
    UserAgent,
    CreatedAt,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
}
