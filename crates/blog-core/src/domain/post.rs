use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permalink::Permalink;
use super::validate::{Validate, validate_slug};
use crate::error::DomainError;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(DomainError::Validation(format!(
                "unknown post status '{other}'"
            ))),
        }
    }
}

/// Post entity - a blog article.
///
/// Posts are listed newest `publish` first. The slug must be unique among
/// posts published on the same UTC calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(length(min = 1, message = "is required"))]
    pub body: String,
    pub publish: DateTime<Utc>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new draft, published "now".
    pub fn new(author_id: Uuid, title: String, slug: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            body,
            publish: now,
            status: PostStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_publish(mut self, publish: DateTime<Utc>) -> Self {
        self.publish = publish;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Canonical date + slug address of this post.
    pub fn permalink(&self) -> Permalink {
        Permalink::for_post(self)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.title.chars().take(19).collect();
        write!(f, "{short}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validate::check_fields;
    use chrono::TimeZone;

    fn sample() -> Post {
        Post::new(
            Uuid::new_v4(),
            "Hello World".to_string(),
            "hello-world".to_string(),
            "Body".to_string(),
        )
    }

    #[test]
    fn test_new_post_is_draft_published_now() {
        let before = Utc::now();
        let post = sample();
        assert_eq!(post.status, PostStatus::Draft);
        assert!(!post.is_published());
        assert!(post.publish >= before);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [PostStatus::Draft, PostStatus::Published] {
            assert_eq!(status.as_str().parse::<PostStatus>().unwrap(), status);
        }
        assert!("archived".parse::<PostStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&PostStatus::Published).unwrap(),
            "\"published\""
        );
    }

    #[test]
    fn test_display_truncates_title() {
        let post = sample().with_status(PostStatus::Published);
        assert_eq!(post.to_string(), "Hello World...");

        let mut long = sample();
        long.title = "A very long title that keeps going".to_string();
        assert_eq!(long.to_string(), "A very long title t...");
    }

    #[test]
    fn test_field_rules() {
        assert!(check_fields(&sample()).is_ok());

        let mut post = sample();
        post.slug = "not a slug".to_string();
        post.title = "x".repeat(201);
        post.body = String::new();
        let DomainError::Validation(msg) = check_fields(&post).unwrap_err();
        assert_eq!(
            msg,
            "body is required; \
             slug must be 1-200 letters, digits, hyphens or underscores; \
             title must be 1-200 characters"
        );
    }

    #[test]
    fn test_permalink_uses_publish_date() {
        let post = sample().with_publish(Utc.with_ymd_and_hms(2023, 5, 1, 9, 30, 0).unwrap());
        let link = post.permalink();
        assert_eq!(link.year(), 2023);
        assert_eq!(link.month(), 5);
        assert_eq!(link.day(), 1);
        assert_eq!(link.slug(), "hello-world");
        assert_eq!(link.path(), "/2023/5/1/hello-world/");
    }
}
