//! Entity traits: identity, and ownership for resources that record an author.

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// A resource whose mutations are restricted to its recorded author.
///
/// Every resource kind that carries an author implements this, so the
/// ownership guard applies to all of them uniformly.
pub trait Owned: Entity {
    fn author_id(&self) -> UserId;
}
