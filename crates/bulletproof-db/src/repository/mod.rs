//! Repositories: one per entity, each operation a single ORM call
//!
//! Repositories borrow any [`sea_orm::ConnectionTrait`] so the same code
//! runs on the pool or inside a transaction.

mod comment;
mod discussion;
mod team;
mod user;

pub use comment::{CommentRepository, NewComment};
pub use discussion::{DiscussionChanges, DiscussionRepository, NewDiscussion};
pub use team::{NewTeam, TeamChanges, TeamRepository};
pub use user::{NewUser, UserChanges, UserRepository};

/// 1-based page request for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
}

impl Page {
    pub const DEFAULT_PER_PAGE: u64 = 10;
    pub const MAX_PER_PAGE: u64 = 100;

    /// Out-of-range values are clamped rather than rejected.
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Zero-based page index as SeaORM's paginator expects it
    pub fn index(&self) -> u64 {
        self.page - 1
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}
