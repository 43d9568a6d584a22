//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of the post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    /// Only posts carrying this tag slug.
    pub tag: Option<String>,
    /// One-based page number.
    pub page: Option<u64>,
}

/// A tag as shown next to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResponse {
    pub name: String,
    pub slug: String,
}

/// A post in a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub permalink: String,
    pub author_id: Uuid,
    pub publish: DateTime<Utc>,
    pub excerpt: String,
}

/// A single post with its visible comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub permalink: String,
    pub author_id: Uuid,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<TagResponse>,
    pub comments: Vec<CommentResponse>,
}

/// One page of posts. `page` is one-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostSummary>,
    pub page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagResponse>,
}

/// Request to comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommentRequest {
    pub name: String,
    pub email: String,
    pub body: String,
}

/// A comment as shown publicly. The email is never echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
