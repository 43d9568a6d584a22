//! Domain entities - the core business objects.

mod comment;
mod permalink;
mod post;
mod tag;
mod user;

pub mod slug;
pub mod validate;

pub use comment::Comment;
pub use permalink::{Permalink, day_range};
pub use post::{Post, PostStatus};
pub use tag::Tag;
pub use user::User;

/// One page of an ordered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Clamp a requested zero-based page to the last existing one.
pub fn last_page_clamp(page: u64, total_pages: u64) -> u64 {
    page.min(total_pages.saturating_sub(1))
}

impl<T> Page<T> {
    /// Slice an already ordered list into the requested page. Pages past the
    /// end yield the last page.
    pub fn from_ordered(items: Vec<T>, page: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let total_items = items.len() as u64;
        let total_pages = total_items.div_ceil(per_page);
        let page = last_page_clamp(page, total_pages);
        let offset = usize::try_from(page.saturating_mul(per_page)).unwrap_or(usize::MAX);
        let take = usize::try_from(per_page).unwrap_or(usize::MAX);
        let items = items.into_iter().skip(offset).take(take).collect();

        Self {
            items,
            page,
            per_page,
            total_items,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}
