//! Blog entries and comments, with ownership enforced on every mutation.

pub mod in_memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quill_auth::Principal;
use quill_core::{
    BlogEntry, BlogEntryUpdate, Comment, CommentId, CommentUpdate, DomainError, EntryId, NewBlogEntry, NewComment,
};

pub use in_memory::InMemoryContentRepository;

pub const DEFAULT_PAGE_LIMIT: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("Not found")]
    NotFound,

    #[error("Not authorized")]
    Forbidden,

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

/// Limit/offset window over a newest-first listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// One page of results; `count` is the total before paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> Paginated<T> {
    pub fn from_newest_first<I>(all: I, page: Page) -> Self
    where
        I: ExactSizeIterator<Item = T>,
    {
        let count = all.len();
        let items = all.skip(page.offset).take(page.limit).collect();
        Self { items, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogEntryDetail {
    #[serde(flatten)]
    pub entry: BlogEntry,
    pub comments: Vec<Comment>,
}

/// Content persistence. Reads are public; every update/delete validates the
/// command, checks ownership against `principal`, then applies, atomically.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_entries(&self, page: Page) -> Result<Paginated<BlogEntry>, ContentError>;

    async fn get_entry(&self, entry_id: EntryId) -> Result<BlogEntryDetail, ContentError>;

    async fn create_entry(
        &self,
        author: &Principal,
        cmd: NewBlogEntry,
        now: DateTime<Utc>,
    ) -> Result<BlogEntry, ContentError>;

    async fn update_entry(
        &self,
        principal: &Principal,
        entry_id: EntryId,
        update: BlogEntryUpdate,
        now: DateTime<Utc>,
    ) -> Result<BlogEntry, ContentError>;

    /// Removes the entry together with its comments.
    async fn delete_entry(&self, principal: &Principal, entry_id: EntryId) -> Result<(), ContentError>;

    async fn list_comments(&self, entry_id: EntryId, page: Page) -> Result<Paginated<Comment>, ContentError>;

    async fn create_comment(
        &self,
        author: &Principal,
        entry_id: EntryId,
        cmd: NewComment,
        now: DateTime<Utc>,
    ) -> Result<Comment, ContentError>;

    async fn update_comment(
        &self,
        principal: &Principal,
        entry_id: EntryId,
        comment_id: CommentId,
        update: CommentUpdate,
        now: DateTime<Utc>,
    ) -> Result<Comment, ContentError>;

    async fn delete_comment(
        &self,
        principal: &Principal,
        entry_id: EntryId,
        comment_id: CommentId,
    ) -> Result<(), ContentError>;
}
