use axum::{Extension, Json, http::StatusCode};

use crate::app::dto::MessageOut;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn protected(Extension(ctx): Extension<PrincipalContext>) -> Json<MessageOut> {
    Json(MessageOut {
        message: format!("Hello, {}!", ctx.principal().username()),
    })
}

pub async fn oauth2_protected(Extension(ctx): Extension<PrincipalContext>) -> Json<MessageOut> {
    Json(MessageOut {
        message: format!("OAuth2 authenticated as {}", ctx.principal().username()),
    })
}
