use std::sync::Arc;

use axum::{Extension, Json};

use quill_core::{Comment, CommentId, CommentUpdate, EntryId, NewComment};
use quill_infra::{Page, Paginated};

use crate::app::dto::SuccessOut;
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(blog_id): ApiPath<EntryId>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Paginated<Comment>>, ApiError> {
    Ok(Json(services.content.list_comments(blog_id, page).await?))
}

pub async fn create_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    ApiPath(blog_id): ApiPath<EntryId>,
    ApiJson(body): ApiJson<NewComment>,
) -> Result<Json<Comment>, ApiError> {
    let comment = services
        .content
        .create_comment(ctx.principal(), blog_id, body, services.clock.now())
        .await?;
    Ok(Json(comment))
}

pub async fn update_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    ApiPath((blog_id, comment_id)): ApiPath<(EntryId, CommentId)>,
    ApiJson(body): ApiJson<CommentUpdate>,
) -> Result<Json<Comment>, ApiError> {
    let comment = services
        .content
        .update_comment(ctx.principal(), blog_id, comment_id, body, services.clock.now())
        .await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    ApiPath((blog_id, comment_id)): ApiPath<(EntryId, CommentId)>,
) -> Result<Json<SuccessOut>, ApiError> {
    services
        .content
        .delete_comment(ctx.principal(), blog_id, comment_id)
        .await?;
    Ok(Json(SuccessOut::ok()))
}
