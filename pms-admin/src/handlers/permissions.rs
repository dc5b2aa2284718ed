use axum::Json;
use serde::Serialize;

use crate::middleware::auth::SessionContext;
use crate::models::SessionUser;
use crate::permissions::{LoadPhase, MenuPermissions, PermissionSnapshot, Role};
use crate::services::metrics::record_permission_fetch;

/// What the console knows about the signed-in account's access.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsView {
    pub user: SessionUser,
    pub phase: LoadPhase,
    pub is_loading: bool,
    pub role: Option<Role>,
    pub is_admin: bool,
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    pub menus: Vec<MenuPermissions>,
}

impl PermissionsView {
    pub fn new(user: SessionUser, snapshot: &PermissionSnapshot) -> Self {
        let data = snapshot.data();
        Self {
            user,
            phase: snapshot.phase(),
            is_loading: snapshot.is_loading(),
            role: snapshot.role(),
            is_admin: snapshot.is_admin(),
            group_id: data.and_then(|d| d.group_id.clone()),
            group_name: data.and_then(|d| d.group_name.clone()),
            menus: data.map(|d| d.menus.clone()).unwrap_or_default(),
        }
    }
}

pub async fn me(ctx: SessionContext) -> Json<PermissionsView> {
    let snapshot = ctx.snapshot().await;
    Json(PermissionsView::new(ctx.user, &snapshot))
}

/// Refetch the session's permissions, e.g. after an administrator changed its group.
pub async fn refresh(ctx: SessionContext) -> Json<PermissionsView> {
    let outcome = ctx.store().fetch_permissions().await;
    record_permission_fetch(outcome.as_str());
    tracing::info!(user_id = %ctx.user.id, outcome = outcome.as_str(), "Permissions refreshed");

    let snapshot = ctx.snapshot().await;
    Json(PermissionsView::new(ctx.user, &snapshot))
}
