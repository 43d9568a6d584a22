//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::slug::slugify;
use blog_core::domain::{Comment, Page, Permalink, Post, Tag, User, last_page_clamp};
use blog_core::error::RepoError;
use blog_core::ports::{CommentRepository, PostRepository, TagRepository, UserRepository};

use super::entity::comment::Entity as CommentEntity;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::entity::post_tag;
use super::postgres_base::{PostgresBaseRepository, repo_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }
}

impl PostgresPostRepository {
    async fn fetch(&self, query: Select<PostEntity>) -> Result<Vec<Post>, RepoError> {
        let result = query.all(self.db.as_ref()).await.map_err(repo_err)?;
        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn all(&self) -> Result<Vec<Post>, RepoError> {
        self.fetch(PostEntity::find_ordered()).await
    }

    async fn published(&self) -> Result<Vec<Post>, RepoError> {
        self.fetch(PostEntity::find_published()).await
    }

    async fn drafts(&self) -> Result<Vec<Post>, RepoError> {
        self.fetch(PostEntity::find_drafts()).await
    }

    async fn published_tagged(&self, tag_slug: &str) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(tag = tag_slug, "Listing published posts by tag");
        self.fetch(PostEntity::find_published_tagged(tag_slug)).await
    }

    async fn published_page(
        &self,
        tag_slug: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError> {
        let query = match tag_slug {
            Some(slug) => PostEntity::find_published_tagged(slug),
            None => PostEntity::find_published(),
        };
        let per_page = per_page.max(1);
        let paginator = query.paginate(self.db.as_ref(), per_page);

        let totals = paginator.num_items_and_pages().await.map_err(repo_err)?;
        let page = last_page_clamp(page, totals.number_of_pages);
        let items = paginator.fetch_page(page).await.map_err(repo_err)?;

        Ok(Page {
            items: items.into_iter().map(Into::into).collect(),
            page,
            per_page,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    async fn find_published_by_permalink(
        &self,
        permalink: &Permalink,
    ) -> Result<Option<Post>, RepoError> {
        tracing::debug!(%permalink, "Resolving permalink");

        let result = PostEntity::find_published_by_permalink(permalink)
            .one(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        self.fetch(PostEntity::find_ordered().filter(post::Column::AuthorId.eq(author_id)))
            .await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find_for_post(post_id)
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find_active_for_post(post_id)
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn tags_for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .join(JoinType::InnerJoin, tag::Relation::PostTags.def())
            .filter(post_tag::Column::PostId.eq(post_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn set_post_tags(&self, post_id: Uuid, names: &[String]) -> Result<Vec<Tag>, RepoError> {
        let txn = self.db.as_ref().begin().await.map_err(repo_err)?;

        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        let mut tags: Vec<Tag> = Vec::with_capacity(names.len());
        for name in names {
            let slug = slugify(name);
            if slug.is_empty() {
                tracing::warn!(tag = %name, "Skipping tag without a usable slug");
                continue;
            }
            if tags.iter().any(|t| t.slug == slug) {
                continue;
            }

            let existing = TagEntity::find()
                .filter(tag::Column::Slug.eq(slug.as_str()))
                .one(&txn)
                .await
                .map_err(repo_err)?;

            let tag: Tag = match existing {
                Some(model) => model.into(),
                None => {
                    let active: tag::ActiveModel = Tag::new(name.as_str()).into();
                    TagEntity::insert(active)
                        .exec_with_returning(&txn)
                        .await
                        .map_err(repo_err)?
                        .into()
                }
            };

            post_tag::Entity::insert(post_tag::ActiveModel {
                post_id: Set(post_id),
                tag_id: Set(tag.id),
            })
            .exec_without_returning(&txn)
            .await
            .map_err(repo_err)?;

            tags.push(tag);
        }

        txn.commit().await.map_err(repo_err)?;

        tracing::debug!(%post_id, count = tags.len(), "Post tags replaced");
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }
}
