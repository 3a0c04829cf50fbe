//! Owned content: blog entries and their comments.
//!
//! Mutations go through explicit command values (`NewBlogEntry`,
//! `BlogEntryUpdate`, ...). An update carries only the fields being changed and
//! is validated as a whole before any field is applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Owned};
use crate::error::{DomainError, DomainResult};
use crate::id::{CommentId, EntryId, UserId};

pub const TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogEntry {
    pub id: EntryId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub blog_entry_id: EntryId,
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for BlogEntry {
    type Id = EntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for BlogEntry {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Comment {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewBlogEntry {
    pub title: String,
    pub content: String,
}

/// Partial update of a blog entry. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BlogEntryUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewComment {
    pub content: String,
}

/// Partial update of a comment. `None` leaves the content unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommentUpdate {
    #[serde(default)]
    pub content: Option<String>,
}

fn check_title(title: &str) -> DomainResult<()> {
    let len = title.chars().count();
    if len == 0 {
        return Err(DomainError::validation("title must not be empty"));
    }
    if len > TITLE_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn check_content(content: &str) -> DomainResult<()> {
    if content.is_empty() {
        return Err(DomainError::validation("content must not be empty"));
    }
    Ok(())
}

impl NewBlogEntry {
    pub fn validate(&self) -> DomainResult<()> {
        check_title(&self.title)?;
        check_content(&self.content)
    }

    /// Build the entry for `author`. Call `validate` first.
    pub fn into_entry(self, author_id: UserId, author_username: String, now: DateTime<Utc>) -> BlogEntry {
        BlogEntry {
            id: EntryId::new(),
            title: self.title,
            content: self.content,
            author_id,
            author_username,
            created_at: now,
            updated_at: now,
        }
    }
}

impl BlogEntryUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(content) = &self.content {
            check_content(content)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

impl BlogEntry {
    /// Apply a validated update. Author and creation time never change.
    pub fn apply(&mut self, update: BlogEntryUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        self.updated_at = now;
    }
}

impl NewComment {
    pub fn validate(&self) -> DomainResult<()> {
        check_content(&self.content)
    }

    pub fn into_comment(
        self,
        blog_entry_id: EntryId,
        author_id: UserId,
        author_username: String,
        now: DateTime<Utc>,
    ) -> Comment {
        Comment {
            id: CommentId::new(),
            blog_entry_id,
            content: self.content,
            author_id,
            author_username,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CommentUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        match &self.content {
            Some(content) => check_content(content),
            None => Ok(()),
        }
    }
}

impl Comment {
    pub fn apply(&mut self, update: CommentUpdate, now: DateTime<Utc>) {
        if let Some(content) = update.content {
            self.content = content;
        }
        self.updated_at = now;
    }
}
