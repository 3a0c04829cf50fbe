use serde::Serialize;
use thiserror::Error;

use quill_core::Owned;

use crate::principal::Principal;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Not authorized")]
    NotAuthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipDecision {
    Allowed,
    Forbidden,
}

impl OwnershipDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, OwnershipDecision::Allowed)
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        match self {
            OwnershipDecision::Allowed => Ok(()),
            OwnershipDecision::Forbidden => Err(AuthzError::NotAuthorized),
        }
    }
}

/// Decide whether `principal` may mutate `resource`.
///
/// Allowed iff a principal is present and its id equals the resource's author.
/// There is no role or admin override. Pure: no IO, no panics.
pub fn authorize_owner<R>(principal: Option<&Principal>, resource: &R) -> OwnershipDecision
where
    R: Owned + ?Sized,
{
    match principal {
        Some(p) if p.id() == resource.author_id() => OwnershipDecision::Allowed,
        _ => OwnershipDecision::Forbidden,
    }
}
