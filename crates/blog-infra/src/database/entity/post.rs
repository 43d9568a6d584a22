//! Post entity for SeaORM, with the named post listings.

use sea_orm::entity::prelude::*;
use sea_orm::{JoinType, QueryFilter, QueryOrder, QuerySelect, Select, Set};

use blog_core::domain::slug::slug_taken_message;
use blog_core::domain::{Permalink, PostStatus, day_range};

use super::active_value;

/// Stored form of [`PostStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum Status {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
}

impl From<PostStatus> for Status {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => Status::Draft,
            PostStatus::Published => Status::Published,
        }
    }
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Draft => PostStatus::Draft,
            Status::Published => PostStatus::Published,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(indexed)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    #[sea_orm(indexed)]
    pub publish: DateTimeWithTimeZone,
    pub status: Status,
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
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_tag::Relation::Post.def().rev())
    }
}

/// Named listings. Each keeps the default `publish DESC` ordering.
impl Entity {
    /// Every post, newest first.
    pub fn find_ordered() -> Select<Entity> {
        Self::find().order_by_desc(Column::Publish)
    }

    pub fn find_published() -> Select<Entity> {
        Self::find_ordered().filter(Column::Status.eq(Status::Published))
    }

    pub fn find_drafts() -> Select<Entity> {
        Self::find_ordered().filter(Column::Status.eq(Status::Draft))
    }

    /// Published posts linked to the tag with `tag_slug`.
    pub fn find_published_tagged(tag_slug: &str) -> Select<Entity> {
        Self::find_published()
            .join(JoinType::InnerJoin, Relation::PostTags.def())
            .join(JoinType::InnerJoin, super::post_tag::Relation::Tag.def())
            .filter(super::tag::Column::Slug.eq(tag_slug))
    }

    /// The published post on the permalink's UTC day with its slug.
    pub fn find_published_by_permalink(permalink: &Permalink) -> Select<Entity> {
        let (start, end) = permalink.publish_range();
        Self::find_published()
            .filter(Column::Slug.eq(permalink.slug()))
            .filter(Column::Publish.gte(start))
            .filter(Column::Publish.lt(end))
    }

    /// Any post other than `except` using `slug` on the UTC day of `publish`.
    pub fn find_slug_on_day(
        slug: &str,
        publish: &DateTimeWithTimeZone,
        except: Option<Uuid>,
    ) -> Select<Entity> {
        let (start, end) = day_range(publish.naive_utc().date());
        let query = Self::find()
            .filter(Column::Slug.eq(slug))
            .filter(Column::Publish.gte(start))
            .filter(Column::Publish.lt(end));

        match except {
            Some(id) => query.filter(Column::Id.ne(id)),
            None => query,
        }
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let (Some(slug), Some(publish)) = (active_value(&self.slug), active_value(&self.publish))
        {
            let except = active_value(&self.id).copied();
            let clash = Entity::find_slug_on_day(slug, publish, except)
                .one(db)
                .await?;

            if clash.is_some() {
                return Err(DbErr::Custom(slug_taken_message(
                    slug,
                    publish.naive_utc().date(),
                )));
            }
        }

        (self.created_at, self.updated_at) = super::timestamps(insert);
        Ok(self)
    }
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for blog_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            slug: model.slug,
            body: model.body,
            publish: model.publish.into(),
            status: model.status.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<blog_core::domain::Post> for ActiveModel {
    fn from(post: blog_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            slug: Set(post.slug),
            body: Set(post.body),
            publish: Set(post.publish.into()),
            status: Set(post.status.into()),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
