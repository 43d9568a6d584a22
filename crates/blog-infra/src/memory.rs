//! In-memory blog store - used when no database is configured.
//!
//! Mirrors the relational rules of the SQL schema: foreign keys must point at
//! existing rows, deletes cascade (user → posts → comments and tag links) and
//! a post slug is unique per UTC publish day. Records failing their field
//! rules are rejected with `RepoError::Validation`.
//! Note: Data is lost on process restart.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::slug::slugify;
use blog_core::domain::validate::check_fields;
use blog_core::domain::{Comment, Page, Permalink, Post, PostStatus, Tag, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};

#[derive(Default)]
struct BlogState {
    users: BTreeMap<Uuid, User>,
    posts: BTreeMap<Uuid, Post>,
    comments: BTreeMap<Uuid, Comment>,
    tags: BTreeMap<Uuid, Tag>,
    /// (post_id, tag_id)
    post_tags: BTreeSet<(Uuid, Uuid)>,
}

impl BlogState {
    fn remove_post(&mut self, post_id: Uuid) -> bool {
        if self.posts.remove(&post_id).is_none() {
            return false;
        }
        let before = self.comments.len();
        self.comments.retain(|_, c| c.post_id != post_id);
        self.post_tags.retain(|(p, _)| *p != post_id);

        tracing::debug!(
            %post_id,
            comments_removed = before - self.comments.len(),
            "Post deleted with its comments"
        );
        true
    }

    fn remove_user(&mut self, user_id: Uuid) -> bool {
        if self.users.remove(&user_id).is_none() {
            return false;
        }
        let owned: Vec<Uuid> = self
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            self.remove_post(post_id);
        }
        true
    }

    fn check_slug(&self, post: &Post) -> Result<(), RepoError> {
        let day = post.publish.date_naive();
        let clash = self
            .posts
            .values()
            .any(|p| p.id != post.id && p.slug == post.slug && p.publish.date_naive() == day);

        if clash {
            return Err(RepoError::slug_taken(&post.slug, day));
        }
        Ok(())
    }

    /// Posts matching `keep`, newest publish first.
    fn posts_where(&self, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.values().filter(|p| keep(p)).cloned().collect();
        posts.sort_by(|a, b| b.publish.cmp(&a.publish));
        posts
    }

    fn tag_by_slug(&self, slug: &str) -> Option<&Tag> {
        self.tags.values().find(|t| t.slug == slug)
    }

    fn has_tag(&self, post_id: Uuid, tag_slug: &str) -> bool {
        self.tag_by_slug(tag_slug)
            .is_some_and(|tag| self.post_tags.contains(&(post_id, tag.id)))
    }
}

/// Shared in-memory state behind the per-entity repositories.
#[derive(Clone, Default)]
pub struct InMemoryBlogStore {
    state: Arc<RwLock<BlogState>>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            state: self.state.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            state: self.state.clone(),
        }
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository {
            state: self.state.clone(),
        }
    }

    pub fn tags(&self) -> InMemoryTagRepository {
        InMemoryTagRepository {
            state: self.state.clone(),
        }
    }
}

pub struct InMemoryUserRepository {
    state: Arc<RwLock<BlogState>>,
}

pub struct InMemoryPostRepository {
    state: Arc<RwLock<BlogState>>,
}

pub struct InMemoryCommentRepository {
    state: Arc<RwLock<BlogState>>,
}

pub struct InMemoryTagRepository {
    state: Arc<RwLock<BlogState>>,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, mut user: User) -> Result<User, RepoError> {
        check_fields(&user)?;

        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        if state.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "Username '{}' is taken",
                user.username
            )));
        }

        let now = Utc::now();
        user.created_at = now;
        user.updated_at = now;
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, mut user: User) -> Result<User, RepoError> {
        check_fields(&user)?;

        let mut state = self.state.write().await;
        let stored = state.users.get(&user.id).ok_or(RepoError::NotFound)?;
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint(format!(
                "Username '{}' is taken",
                user.username
            )));
        }

        user.created_at = stored.created_at;
        user.updated_at = Utc::now();
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.state.write().await.remove_user(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, mut post: Post) -> Result<Post, RepoError> {
        check_fields(&post)?;

        let mut state = self.state.write().await;
        if state.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        if !state.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "Author {} does not exist",
                post.author_id
            )));
        }
        state.check_slug(&post)?;

        let now = Utc::now();
        post.created_at = now;
        post.updated_at = now;
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, mut post: Post) -> Result<Post, RepoError> {
        check_fields(&post)?;

        let mut state = self.state.write().await;
        let created_at = state
            .posts
            .get(&post.id)
            .map(|p| p.created_at)
            .ok_or(RepoError::NotFound)?;
        if !state.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "Author {} does not exist",
                post.author_id
            )));
        }
        state.check_slug(&post)?;

        post.created_at = created_at;
        post.updated_at = Utc::now();
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.state.write().await.remove_post(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.state.read().await.posts_where(|_| true))
    }

    async fn published(&self) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts_where(|p| p.status == PostStatus::Published))
    }

    async fn drafts(&self) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts_where(|p| p.status == PostStatus::Draft))
    }

    async fn published_tagged(&self, tag_slug: &str) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts_where(|p| p.is_published() && state.has_tag(p.id, tag_slug)))
    }

    async fn published_page(
        &self,
        tag_slug: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError> {
        let posts = match tag_slug {
            Some(slug) => self.published_tagged(slug).await?,
            None => self.published().await?,
        };
        Ok(Page::from_ordered(posts, page, per_page))
    }

    async fn find_published_by_permalink(
        &self,
        permalink: &Permalink,
    ) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .find(|p| p.is_published() && p.permalink() == *permalink)
            .cloned())
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts_where(|p| p.author_id == author_id))
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, mut comment: Comment) -> Result<Comment, RepoError> {
        check_fields(&comment)?;

        let mut state = self.state.write().await;
        if state.comments.contains_key(&comment.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        if !state.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "Post {} does not exist",
                comment.post_id
            )));
        }

        let now = Utc::now();
        comment.created_at = now;
        comment.updated_at = now;
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, mut comment: Comment) -> Result<Comment, RepoError> {
        check_fields(&comment)?;

        let mut state = self.state.write().await;
        let created_at = state
            .comments
            .get(&comment.id)
            .map(|c| c.created_at)
            .ok_or(RepoError::NotFound)?;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "Post {} does not exist",
                comment.post_id
            )));
        }

        comment.created_at = created_at;
        comment.updated_at = Utc::now();
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.state.write().await.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut comments = self.for_post(post_id).await?;
        comments.retain(|c| c.active);
        Ok(comments)
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn tags_for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .post_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .filter_map(|(_, t)| state.tags.get(t).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn set_post_tags(&self, post_id: Uuid, names: &[String]) -> Result<Vec<Tag>, RepoError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Err(RepoError::Constraint(format!("Post {post_id} does not exist")));
        }
        state.post_tags.retain(|(p, _)| *p != post_id);

        let mut tags: Vec<Tag> = Vec::with_capacity(names.len());
        for name in names {
            let slug = slugify(name);
            if slug.is_empty() || tags.iter().any(|t| t.slug == slug) {
                continue;
            }

            let existing = state.tag_by_slug(&slug).cloned();
            let tag = match existing {
                Some(existing) => existing,
                None => {
                    let tag = Tag::new(name.as_str());
                    state.tags.insert(tag.id, tag.clone());
                    tag
                }
            };
            state.post_tags.insert((post_id, tag.id));
            tags.push(tag);
        }

        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        Ok(self.state.read().await.tag_by_slug(slug).cloned())
    }
}
