//! `AccessTokenStore` implementations for externally issued opaque tokens.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryAccessTokenStore;
pub use postgres::PostgresAccessTokenStore;
