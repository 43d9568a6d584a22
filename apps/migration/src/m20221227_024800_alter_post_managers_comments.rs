//! Comments on posts.
//!
//! The published/draft post listings are query helpers in code, so adding the
//! `published` listing needs no DDL. This migration only creates `comments`.

use sea_orm_migration::prelude::*;

use crate::m20221226_000001_initial::Post;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    PostId,
    Name,
    Email,
    Body,
    CreatedAt,
    UpdatedAt,
    Active,
}

pub(crate) fn create_comments_table() -> TableCreateStatement {
    Table::create()
        .table(Comments::Table)
        .if_not_exists()
        .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Comments::PostId).uuid().not_null())
        .col(ColumnDef::new(Comments::Name).string_len(100).not_null())
        .col(ColumnDef::new(Comments::Email).string_len(254).not_null())
        .col(ColumnDef::new(Comments::Body).text().not_null())
        .col(
            ColumnDef::new(Comments::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Comments::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Comments::Active)
                .boolean()
                .not_null()
                .default(true),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_comments_post")
                .from(Comments::Table, Comments::PostId)
                .to(Post::Table, Post::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(create_comments_table()).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_comments_post_created")
                    .table(Comments::Table)
                    .col(Comments::PostId)
                    .col(Comments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        tracing::info!("Created comments table");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_table_shape() {
        let sql = create_comments_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"CREATE TABLE IF NOT EXISTS "comments""#));
        assert!(sql.contains(r#""active" bool NOT NULL DEFAULT TRUE"#));
        assert!(sql.contains(r#""name" varchar(100) NOT NULL"#));
        assert!(sql.contains(r#"FOREIGN KEY ("post_id") REFERENCES "post" ("id")"#));
        assert!(sql.contains("ON DELETE CASCADE"));
    }
}
