//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store backends and the shared `AppServices`
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: `ApiError` and its JSON responses
//! - `extract.rs`: body/path/query extractors rejecting with `ApiError`

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use quill_auth::{Clock, TokenValidator};

use crate::config::ApiConfig;
use crate::middleware::{AuthState, Schemes};

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::Backends;

/// Build the full HTTP router (public entrypoint used by `main.rs` and black-box tests).
pub fn build_app(config: &ApiConfig, backends: Backends, clock: Arc<dyn Clock>) -> Router {
    let schemes = Schemes {
        self_signed: AuthState {
            validator: Arc::new(TokenValidator::self_signed(&config.token, backends.users.clone())),
            clock: clock.clone(),
        },
        opaque: AuthState {
            validator: Arc::new(TokenValidator::opaque(
                backends.access_tokens.clone(),
                backends.users.clone(),
                config.token.leeway_secs,
            )),
            clock: clock.clone(),
        },
    };

    let services = Arc::new(services::build_services(config, &backends, clock));

    routes::router(&schemes).layer(ServiceBuilder::new().layer(Extension(services)))
}
