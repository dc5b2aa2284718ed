//! Plan and user screens. Every handler checks the acting account's permission
//! on the resource's menu pair before calling the backend.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use super::extract::AppJson;
use crate::middleware::auth::SessionContext;
use crate::models::{BulkDeleteRequest, FormInput};
use crate::permissions::Capability;
use crate::resources::{AdminResource, EditableResource, Plans};
use crate::AppState;

pub async fn list<R: AdminResource>(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<Json<Vec<R::Item>>, AppError> {
    ctx.authorize::<R>(None).await?;
    let items = state.backend.list::<R>(ctx.credential()).await?;
    Ok(Json(items))
}

pub async fn create<R: EditableResource>(
    State(state): State<AppState>,
    ctx: SessionContext,
    AppJson(input): AppJson<R::Create>,
) -> Result<(StatusCode, Json<R::Item>), AppError> {
    ctx.authorize::<R>(Some(Capability::Add)).await?;
    let body = input.validated()?;

    let created = state.backend.create::<R, _>(ctx.credential(), &body).await?;
    tracing::info!(user_id = %ctx.user.id, resource = R::NAME, "Record created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<R: EditableResource>(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    AppJson(input): AppJson<R::Update>,
) -> Result<Json<R::Item>, AppError> {
    ctx.authorize::<R>(Some(Capability::Change)).await?;
    let body = input.validated()?;

    let updated = state
        .backend
        .update::<R, _>(ctx.credential(), &id, &body)
        .await?;
    tracing::info!(user_id = %ctx.user.id, resource = R::NAME, id = %id, "Record updated");
    Ok(Json(updated))
}

pub async fn delete<R: AdminResource>(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.authorize::<R>(Some(Capability::Delete)).await?;
    state.backend.delete::<R>(ctx.credential(), &id).await?;
    tracing::info!(user_id = %ctx.user.id, resource = R::NAME, id = %id, "Record deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_delete_plans(
    State(state): State<AppState>,
    ctx: SessionContext,
    AppJson(request): AppJson<BulkDeleteRequest>,
) -> Result<StatusCode, AppError> {
    ctx.authorize::<Plans>(Some(Capability::Delete)).await?;
    request.validate()?;

    state
        .backend
        .bulk_delete_plans(ctx.credential(), &request)
        .await?;
    tracing::info!(user_id = %ctx.user.id, count = request.ids.len(), "Plans deleted");
    Ok(StatusCode::NO_CONTENT)
}
