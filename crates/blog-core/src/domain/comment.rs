use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::Post;
use super::validate::Validate;

/// Comment entity - a reader's reply on a post.
///
/// Comments are listed oldest first. `active` is the moderation switch;
/// only active comments are shown publicly.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(
        email(message = "must be a valid address"),
        length(max = 254, message = "must be at most 254 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub body: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new, active comment.
    pub fn new(post_id: Uuid, name: String, email: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            name,
            email,
            body,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// `Comment by {name} on {post}`.
    pub fn summary(&self, post: &Post) -> String {
        format!("Comment by {} on {}", self.name, post)
    }
}
