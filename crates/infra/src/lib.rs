//! Infrastructure layer: credential, opaque-token, and content stores.

pub mod access_tokens;
pub mod content;
pub mod credentials;
pub mod db;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
pub(crate) mod test_support;

pub use access_tokens::{InMemoryAccessTokenStore, PostgresAccessTokenStore};
pub use content::{
    BlogEntryDetail, ContentError, ContentRepository, DEFAULT_PAGE_LIMIT, InMemoryContentRepository, Page,
    Paginated,
};
pub use credentials::{InMemoryCredentialStore, PostgresCredentialStore};
