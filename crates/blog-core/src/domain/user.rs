use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validate::Validate;

/// User entity - the account a post is authored by.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,
    #[validate(length(min = 1, max = 150, message = "must be 1-150 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid address"))]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            created_at: now,
            updated_at: now,
        }
    }
}
