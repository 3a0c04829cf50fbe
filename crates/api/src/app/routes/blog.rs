use std::sync::Arc;

use axum::{Extension, Json};

use quill_core::{BlogEntry, BlogEntryUpdate, EntryId, NewBlogEntry};
use quill_infra::{BlogEntryDetail, Page, Paginated};

use crate::app::dto::SuccessOut;
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn list_entries(
    Extension(services): Extension<Arc<AppServices>>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Paginated<BlogEntry>>, ApiError> {
    Ok(Json(services.content.list_entries(page).await?))
}

pub async fn get_entry(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(entry_id): ApiPath<EntryId>,
) -> Result<Json<BlogEntryDetail>, ApiError> {
    Ok(Json(services.content.get_entry(entry_id).await?))
}

pub async fn create_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<NewBlogEntry>,
) -> Result<Json<BlogEntry>, ApiError> {
    let entry = services
        .content
        .create_entry(ctx.principal(), body, services.clock.now())
        .await?;
    Ok(Json(entry))
}

pub async fn update_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    ApiPath(entry_id): ApiPath<EntryId>,
    ApiJson(body): ApiJson<BlogEntryUpdate>,
) -> Result<Json<BlogEntry>, ApiError> {
    let entry = services
        .content
        .update_entry(ctx.principal(), entry_id, body, services.clock.now())
        .await?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    ApiPath(entry_id): ApiPath<EntryId>,
) -> Result<Json<SuccessOut>, ApiError> {
    services.content.delete_entry(ctx.principal(), entry_id).await?;
    Ok(Json(SuccessOut::ok()))
}
