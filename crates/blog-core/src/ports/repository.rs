use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Page, Permalink, Post, Tag, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// Implementations own the `created_at` / `updated_at` columns: `insert`
/// stamps both, `update` refreshes `updated_at` and keeps the stored
/// `created_at`.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Store a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, cascading to dependent records.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Every listing is ordered by `publish`, newest first.
///
/// `insert` and `update` reject a slug already used by another post on the
/// same publish date with [`RepoError::Constraint`].
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Every post regardless of status.
    async fn all(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts with status `published`.
    async fn published(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts with status `draft`.
    async fn drafts(&self) -> Result<Vec<Post>, RepoError>;

    /// Published posts carrying the tag with the given slug.
    async fn published_tagged(&self, tag_slug: &str) -> Result<Vec<Post>, RepoError>;

    /// One page of published posts, optionally restricted to a tag.
    async fn published_page(
        &self,
        tag_slug: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError>;

    /// The published post addressed by a permalink.
    async fn find_published_by_permalink(
        &self,
        permalink: &Permalink,
    ) -> Result<Option<Post>, RepoError>;

    /// Posts written by one author.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository. Listings are ordered by `created_at`, oldest first.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Every comment on a post, moderated or not.
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Comments on a post that are still active.
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// Tag storage and the post/tag association.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Tags on a post, ordered by name.
    async fn tags_for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError>;

    /// Replace the tag set of a post. Unknown names create tags; names are
    /// matched on their slug. Returns the resulting set ordered by name.
    async fn set_post_tags(&self, post_id: Uuid, names: &[String]) -> Result<Vec<Tag>, RepoError>;

    /// Find a tag by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;
}
