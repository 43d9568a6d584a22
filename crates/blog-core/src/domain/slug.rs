//! Slug helpers for URL-safe post and tag identifiers.

/// Maximum stored slug length.
pub const MAX_SLUG_LEN: usize = 200;

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Returns true when `slug` is non-empty, fits the column and only holds
/// ASCII letters, digits, hyphens and underscores.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.len() <= MAX_SLUG_LEN && slug.chars().all(is_slug_char)
}

/// Turn free text into a slug.
///
/// Lowercases ASCII, collapses every run of other characters into a single
/// hyphen and trims hyphens at both ends. Non-ASCII characters are dropped
/// rather than transliterated.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c.is_ascii_punctuation() {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Message reported when a slug is already used on a publish date.
pub fn slug_taken_message(slug: &str, date: chrono::NaiveDate) -> String {
    format!("Slug '{slug}' is already used by a post published on {date}")
}
