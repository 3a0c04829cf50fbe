use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
    routing::MethodRouter,
};

use quill_auth::{AuthOutcome, Clock, TokenValidator};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

/// One validation scheme plus the clock its expiry checks read.
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<TokenValidator>,
    pub clock: Arc<dyn Clock>,
}

/// The two bearer schemes, applied per endpoint.
#[derive(Clone)]
pub struct Schemes {
    pub self_signed: AuthState,
    pub opaque: AuthState,
}

impl Schemes {
    /// Require a self-signed token on every method of `route`.
    pub fn self_signed(&self, route: MethodRouter) -> MethodRouter {
        route.route_layer(axum::middleware::from_fn_with_state(
            self.self_signed.clone(),
            require_bearer,
        ))
    }

    /// Require an opaque provider token on every method of `route`.
    pub fn opaque(&self, route: MethodRouter) -> MethodRouter {
        route.route_layer(axum::middleware::from_fn_with_state(self.opaque.clone(), require_bearer))
    }
}

pub async fn require_bearer(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())
        .ok_or(ApiError::Unauthorized)?
        .to_owned();

    let outcome = state
        .validator
        .validate(&token, state.clock.now())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let AuthOutcome::Authenticated(principal) = outcome else {
        return Err(ApiError::Unauthorized);
    };

    req.extensions_mut()
        .insert(PrincipalContext::new(principal, state.validator.scheme()));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers("bearer  tok ")), Some("tok"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&headers("Bearer")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
