//! Comment entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, QueryOrder, Select, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    #[sea_orm(indexed)]
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub active: bool,
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

impl Entity {
    /// Comments on a post, oldest first.
    pub fn find_for_post(post_id: Uuid) -> Select<Entity> {
        Self::find()
            .filter(Column::PostId.eq(post_id))
            .order_by_asc(Column::CreatedAt)
    }

    /// Comments on a post that passed moderation, oldest first.
    pub fn find_active_for_post(post_id: Uuid) -> Select<Entity> {
        Self::find_for_post(post_id).filter(Column::Active.eq(true))
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            active: Set(true),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        (self.created_at, self.updated_at) = super::timestamps(insert);
        Ok(self)
    }
}

/// Conversion from SeaORM Model to Domain Comment.
impl From<Model> for blog_core::domain::Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            name: model.name,
            email: model.email,
            body: model.body,
            active: model.active,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Comment to SeaORM ActiveModel.
impl From<blog_core::domain::Comment> for ActiveModel {
    fn from(comment: blog_core::domain::Comment) -> Self {
        Self {
            id: Set(comment.id),
            post_id: Set(comment.post_id),
            name: Set(comment.name),
            email: Set(comment.email),
            body: Set(comment.body),
            created_at: Set(comment.created_at.into()),
            updated_at: Set(comment.updated_at.into()),
            active: Set(comment.active),
        }
    }
}
