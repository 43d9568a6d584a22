use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::slugify;

/// A label attached to posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Tag {
    /// New tag whose slug is derived from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        let slug = slugify(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
        }
    }
}
