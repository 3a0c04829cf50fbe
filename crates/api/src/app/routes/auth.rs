use std::sync::Arc;

use axum::{Extension, Json};

use quill_auth::{IssuedToken, RegisterRequest};

use crate::app::dto::{LoginRequest, LogoutRequest, SuccessOut, UserOut};
use crate::app::errors::ApiError;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<UserOut>, ApiError> {
    let user = services.auth.register(body).await?;
    Ok(Json(UserOut::from(&user)))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    let token = services
        .auth
        .login(&body.username, &body.password, services.clock.now())
        .await?;
    Ok(Json(token))
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(_body): ApiJson<LogoutRequest>,
) -> Json<SuccessOut> {
    services.auth.logout();
    Json(SuccessOut::ok())
}

pub async fn me(Extension(ctx): Extension<PrincipalContext>) -> Json<UserOut> {
    Json(UserOut::from(ctx.principal()))
}
