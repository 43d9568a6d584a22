//! Users, posts and tags.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Post {
    Table,
    Id,
    AuthorId,
    Title,
    Slug,
    Body,
    Publish,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Tags {
    Table,
    Id,
    Name,
    Slug,
}

#[derive(DeriveIden)]
pub(crate) enum PostTags {
    Table,
    PostId,
    TagId,
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

pub(crate) fn create_users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
        .col(
            ColumnDef::new(Users::Username)
                .string_len(150)
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Users::Email).string_len(254).not_null())
        .col(timestamp(Users::CreatedAt))
        .col(timestamp(Users::UpdatedAt))
        .to_owned()
}

pub(crate) fn create_post_table() -> TableCreateStatement {
    Table::create()
        .table(Post::Table)
        .if_not_exists()
        .col(ColumnDef::new(Post::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Post::AuthorId).uuid().not_null())
        .col(ColumnDef::new(Post::Title).string_len(200).not_null())
        .col(ColumnDef::new(Post::Slug).string_len(200).not_null())
        .col(ColumnDef::new(Post::Body).text().not_null())
        .col(timestamp(Post::Publish))
        .col(
            ColumnDef::new(Post::Status)
                .string_len(10)
                .not_null()
                .default("draft"),
        )
        .col(timestamp(Post::CreatedAt))
        .col(timestamp(Post::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_post_author")
                .from(Post::Table, Post::AuthorId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

pub(crate) fn create_tags_table() -> TableCreateStatement {
    Table::create()
        .table(Tags::Table)
        .if_not_exists()
        .col(ColumnDef::new(Tags::Id).uuid().not_null().primary_key())
        .col(
            ColumnDef::new(Tags::Name)
                .string_len(100)
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(Tags::Slug)
                .string_len(100)
                .not_null()
                .unique_key(),
        )
        .to_owned()
}

pub(crate) fn create_post_tags_table() -> TableCreateStatement {
    Table::create()
        .table(PostTags::Table)
        .if_not_exists()
        .col(ColumnDef::new(PostTags::PostId).uuid().not_null())
        .col(ColumnDef::new(PostTags::TagId).uuid().not_null())
        .primary_key(Index::create().col(PostTags::PostId).col(PostTags::TagId))
        .foreign_key(
            ForeignKey::create()
                .name("fk_post_tags_post")
                .from(PostTags::Table, PostTags::PostId)
                .to(Post::Table, Post::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_post_tags_tag")
                .from(PostTags::Table, PostTags::TagId)
                .to(Tags::Table, Tags::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(create_users_table()).await?;
        manager.create_table(create_post_table()).await?;

        // Slug lookups are always scoped to a publish day.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_post_slug")
                    .table(Post::Table)
                    .col(Post::Slug)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_post_publish")
                    .table(Post::Table)
                    .col(Post::Publish)
                    .to_owned(),
            )
            .await?;

        manager.create_table(create_tags_table()).await?;
        manager.create_table(create_post_tags_table()).await?;

        tracing::info!("Created users, post, tags and post_tags tables");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_table_cascades_from_author() {
        let sql = create_post_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"CREATE TABLE IF NOT EXISTS "post""#));
        assert!(sql.contains(r#"REFERENCES "users" ("id")"#));
        assert!(sql.contains("ON DELETE CASCADE"));
        assert!(sql.contains(r#""status" varchar(10) NOT NULL DEFAULT 'draft'"#));
    }

    #[test]
    fn test_post_tags_links_cascade_both_ways() {
        let sql = create_post_tags_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"REFERENCES "post" ("id")"#));
        assert!(sql.contains(r#"REFERENCES "tags" ("id")"#));
        assert_eq!(sql.matches("ON DELETE CASCADE").count(), 2);
    }
}
