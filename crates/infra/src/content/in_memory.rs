use std::sync::{RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use quill_auth::{OwnershipDecision, Principal, authorize_owner};
use quill_core::{
    BlogEntry, BlogEntryUpdate, Comment, CommentId, CommentUpdate, EntryId, NewBlogEntry, NewComment, Owned,
};

use super::{BlogEntryDetail, ContentError, ContentRepository, Page, Paginated};

/// Insertion-ordered state; listing newest-first is a reverse walk.
#[derive(Debug, Default)]
struct ContentState {
    entries: Vec<BlogEntry>,
    comments: Vec<Comment>,
}

impl ContentState {
    fn entry_index(&self, id: EntryId) -> Result<usize, ContentError> {
        self.entries.iter().position(|e| e.id == id).ok_or(ContentError::NotFound)
    }

    fn comment_index(&self, entry_id: EntryId, id: CommentId) -> Result<usize, ContentError> {
        self.comments
            .iter()
            .position(|c| c.id == id && c.blog_entry_id == entry_id)
            .ok_or(ContentError::NotFound)
    }

    fn comments_of(&self, entry_id: EntryId) -> Vec<Comment> {
        self.comments
            .iter()
            .rev()
            .filter(|c| c.blog_entry_id == entry_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    state: RwLock<ContentState>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ContentState>, ContentError> {
        self.state
            .write()
            .map_err(|_| ContentError::Unavailable("content lock poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&ContentState) -> T) -> Result<T, ContentError> {
        let state = self
            .state
            .read()
            .map_err(|_| ContentError::Unavailable("content lock poisoned".to_string()))?;
        Ok(f(&state))
    }
}

fn guard<R: Owned>(principal: &Principal, resource: &R, kind: &'static str) -> Result<(), ContentError> {
    match authorize_owner(Some(principal), resource) {
        OwnershipDecision::Allowed => Ok(()),
        OwnershipDecision::Forbidden => {
            tracing::info!(principal_id = %principal.id(), resource = kind, "ownership check refused mutation");
            Err(ContentError::Forbidden)
        }
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn list_entries(&self, page: Page) -> Result<Paginated<BlogEntry>, ContentError> {
        self.read(|s| Paginated::from_newest_first(s.entries.iter().rev().cloned(), page))
    }

    async fn get_entry(&self, entry_id: EntryId) -> Result<BlogEntryDetail, ContentError> {
        self.read(|s| {
            let idx = s.entry_index(entry_id)?;
            Ok(BlogEntryDetail {
                entry: s.entries[idx].clone(),
                comments: s.comments_of(entry_id),
            })
        })?
    }

    async fn create_entry(
        &self,
        author: &Principal,
        cmd: NewBlogEntry,
        now: DateTime<Utc>,
    ) -> Result<BlogEntry, ContentError> {
        cmd.validate()?;
        let entry = cmd.into_entry(author.id(), author.username().to_string(), now);
        self.write()?.entries.push(entry.clone());
        tracing::info!(entry_id = %entry.id, author_id = %author.id(), "blog entry created");
        Ok(entry)
    }

    async fn update_entry(
        &self,
        principal: &Principal,
        entry_id: EntryId,
        update: BlogEntryUpdate,
        now: DateTime<Utc>,
    ) -> Result<BlogEntry, ContentError> {
        update.validate()?;
        let mut state = self.write()?;
        let idx = state.entry_index(entry_id)?;
        let entry = &mut state.entries[idx];
        guard(principal, &*entry, "blog_entry")?;
        entry.apply(update, now);
        Ok(entry.clone())
    }

    async fn delete_entry(&self, principal: &Principal, entry_id: EntryId) -> Result<(), ContentError> {
        let mut state = self.write()?;
        let idx = state.entry_index(entry_id)?;
        guard(principal, &state.entries[idx], "blog_entry")?;
        state.entries.remove(idx);
        state.comments.retain(|c| c.blog_entry_id != entry_id);
        tracing::info!(%entry_id, "blog entry deleted");
        Ok(())
    }

    async fn list_comments(&self, entry_id: EntryId, page: Page) -> Result<Paginated<Comment>, ContentError> {
        self.read(|s| Paginated::from_newest_first(s.comments_of(entry_id).into_iter(), page))
    }

    async fn create_comment(
        &self,
        author: &Principal,
        entry_id: EntryId,
        cmd: NewComment,
        now: DateTime<Utc>,
    ) -> Result<Comment, ContentError> {
        cmd.validate()?;
        let mut state = self.write()?;
        state.entry_index(entry_id)?;
        let comment = cmd.into_comment(entry_id, author.id(), author.username().to_string(), now);
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        principal: &Principal,
        entry_id: EntryId,
        comment_id: CommentId,
        update: CommentUpdate,
        now: DateTime<Utc>,
    ) -> Result<Comment, ContentError> {
        update.validate()?;
        let mut state = self.write()?;
        let idx = state.comment_index(entry_id, comment_id)?;
        let comment = &mut state.comments[idx];
        guard(principal, &*comment, "comment")?;
        comment.apply(update, now);
        Ok(comment.clone())
    }

    async fn delete_comment(
        &self,
        principal: &Principal,
        entry_id: EntryId,
        comment_id: CommentId,
    ) -> Result<(), ContentError> {
        let mut state = self.write()?;
        let idx = state.comment_index(entry_id, comment_id)?;
        guard(principal, &state.comments[idx], "comment")?;
        state.comments.remove(idx);
        Ok(())
    }
}
