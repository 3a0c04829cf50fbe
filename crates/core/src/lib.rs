//! `quill-core`: domain building blocks shared by the auth layer and stores.
//!
//! This crate contains **pure domain** primitives (no IO, no HTTP).

pub mod content;
pub mod entity;
pub mod error;
pub mod id;

pub use content::{BlogEntry, BlogEntryUpdate, Comment, CommentUpdate, NewBlogEntry, NewComment};
pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult};
pub use id::{CommentId, EntryId, UserId};
