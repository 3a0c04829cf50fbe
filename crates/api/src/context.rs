use quill_auth::{Principal, TokenScheme};
use quill_core::UserId;

/// Authenticated identity for a request, plus the scheme that vouched for it.
///
/// Inserted by the bearer middleware; absent on public routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    scheme: TokenScheme,
}

impl PrincipalContext {
    pub fn new(principal: Principal, scheme: TokenScheme) -> Self {
        Self { principal, scheme }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.id()
    }

    pub fn scheme(&self) -> TokenScheme {
        self.scheme
    }
}
