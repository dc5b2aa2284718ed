//! Group permission matrix: a working copy held in the browser session, edited
//! one toggle at a time and submitted whole.

use anyhow::anyhow;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use super::extract::AppJson;
use crate::catalog::MenuCatalog;
use crate::matrix::{MatrixRow, PermissionMatrix};
use crate::middleware::auth::{session_error, SessionContext, MATRIX_KEY};
use crate::models::{Group, GroupInput};
use crate::permissions::Capability;
use crate::resources::Groups;
use crate::services::metrics::record_permission_fetch;
use crate::AppState;

/// Working copy of one group's permissions. `group_id` is `None` for a new group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatrixDraft {
    pub group_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub matrix: PermissionMatrix,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenMatrixRequest {
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub main_menu: String,
    pub sub_menu: String,
    pub field: Capability,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAllRequest {
    pub main_menu: String,
    pub sub_menu: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixView {
    pub group_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub rows: Vec<MatrixRow>,
}

impl MatrixView {
    fn new(draft: &MatrixDraft, catalog: &MenuCatalog) -> Self {
        Self {
            group_id: draft.group_id.clone(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            rows: draft.matrix.rows(catalog),
        }
    }
}

async fn load_draft(ctx: &SessionContext) -> Result<MatrixDraft, AppError> {
    ctx.session
        .get::<MatrixDraft>(MATRIX_KEY)
        .await
        .map_err(session_error)?
        .ok_or_else(|| AppError::NotFound(anyhow!("No permission matrix is open")))
}

async fn store_draft(ctx: &SessionContext, draft: &MatrixDraft) -> Result<(), AppError> {
    ctx.session
        .insert(MATRIX_KEY, draft)
        .await
        .map_err(session_error)
}

/// Resolve a catalog pair to its URL, rejecting pairs the catalog does not list.
fn catalog_url<'a>(
    catalog: &'a MenuCatalog,
    main_menu: &str,
    sub_menu: &str,
) -> Result<&'a str, AppError> {
    catalog
        .find(main_menu)
        .and_then(|entry| entry.sub_menu(sub_menu))
        .map(|sub| sub.url.as_str())
        .ok_or_else(|| {
            AppError::BadRequest(anyhow!(
                "Unknown menu pair {} / {}",
                main_menu,
                sub_menu
            ))
        })
}

fn required_capability(draft: &MatrixDraft) -> Capability {
    if draft.group_id.is_some() {
        Capability::Change
    } else {
        Capability::Add
    }
}

/// Start editing: an empty matrix for a new group, or a copy of an existing group's records.
pub async fn open_matrix(
    State(state): State<AppState>,
    ctx: SessionContext,
    request: Option<Json<OpenMatrixRequest>>,
) -> Result<Json<MatrixView>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let draft = match request.group_id {
        None => {
            ctx.authorize::<Groups>(Some(Capability::Add)).await?;
            MatrixDraft::default()
        }
        Some(group_id) => {
            ctx.authorize::<Groups>(Some(Capability::Change)).await?;
            let group: Group = state
                .backend
                .list::<Groups>(ctx.credential())
                .await?
                .into_iter()
                .find(|g| g.id == group_id)
                .ok_or_else(|| AppError::NotFound(anyhow!("Group not found")))?;

            MatrixDraft {
                group_id: Some(group.id),
                name: group.name,
                description: group.description,
                matrix: PermissionMatrix::from_records(group.permissions),
            }
        }
    };

    store_draft(&ctx, &draft).await?;
    tracing::debug!(
        user_id = %ctx.user.id,
        group_id = draft.group_id.as_deref().unwrap_or("new"),
        records = draft.matrix.len(),
        "Permission matrix opened"
    );
    Ok(Json(MatrixView::new(&draft, &state.catalog)))
}

pub async fn matrix_rows(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<Json<MatrixView>, AppError> {
    ctx.authorize::<Groups>(None).await?;
    let draft = load_draft(&ctx).await?;
    Ok(Json(MatrixView::new(&draft, &state.catalog)))
}

pub async fn toggle(
    State(state): State<AppState>,
    ctx: SessionContext,
    AppJson(request): AppJson<ToggleRequest>,
) -> Result<Json<MatrixView>, AppError> {
    let mut draft = load_draft(&ctx).await?;
    ctx.authorize::<Groups>(Some(required_capability(&draft))).await?;

    let url = catalog_url(&state.catalog, &request.main_menu, &request.sub_menu)?;
    draft
        .matrix
        .toggle(&request.main_menu, &request.sub_menu, url, request.field);

    store_draft(&ctx, &draft).await?;
    Ok(Json(MatrixView::new(&draft, &state.catalog)))
}

pub async fn toggle_all(
    State(state): State<AppState>,
    ctx: SessionContext,
    AppJson(request): AppJson<ToggleAllRequest>,
) -> Result<Json<MatrixView>, AppError> {
    let mut draft = load_draft(&ctx).await?;
    ctx.authorize::<Groups>(Some(required_capability(&draft))).await?;

    let url = catalog_url(&state.catalog, &request.main_menu, &request.sub_menu)?;
    draft
        .matrix
        .toggle_all(&request.main_menu, &request.sub_menu, url);

    store_draft(&ctx, &draft).await?;
    Ok(Json(MatrixView::new(&draft, &state.catalog)))
}

/// Create or update the group from the working copy, then close it.
///
/// The session's own permissions are refetched when it belongs to the saved group.
pub async fn save(
    State(state): State<AppState>,
    ctx: SessionContext,
    AppJson(input): AppJson<GroupInput>,
) -> Result<Json<Group>, AppError> {
    let draft = load_draft(&ctx).await?;
    ctx.authorize::<Groups>(Some(required_capability(&draft))).await?;
    input.validate()?;

    let body = input.into_body(draft.matrix);
    let saved = match draft.group_id.as_deref() {
        None => state.backend.create::<Groups, _>(ctx.credential(), &body).await?,
        Some(id) => {
            state
                .backend
                .update::<Groups, _>(ctx.credential(), id, &body)
                .await?
        }
    };

    ctx.session
        .remove::<MatrixDraft>(MATRIX_KEY)
        .await
        .map_err(session_error)?;

    tracing::info!(
        user_id = %ctx.user.id,
        group_id = %saved.id,
        records = body.permissions.len(),
        "Group permissions saved"
    );

    let own_group = ctx.snapshot().await.data().and_then(|d| d.group_id.clone());
    if own_group.as_deref() == Some(saved.id.as_str()) {
        let outcome = ctx.store().fetch_permissions().await;
        record_permission_fetch(outcome.as_str());
    }

    Ok(Json(saved))
}
