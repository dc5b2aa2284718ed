use askama::Template;
use axum::{extract::State, Json};

use crate::menu::{filter_menu, MenuGroup};
use crate::middleware::auth::SessionContext;
use crate::AppState;

#[derive(Template)]
#[template(path = "sidebar.html")]
pub struct SidebarTemplate {
    pub display_name: String,
    pub group_name: Option<String>,
    pub groups: Vec<MenuGroup>,
}

pub async fn menu(State(state): State<AppState>, ctx: SessionContext) -> Json<Vec<MenuGroup>> {
    let snapshot = ctx.snapshot().await;
    Json(filter_menu(&state.catalog, &snapshot))
}

pub async fn sidebar(State(state): State<AppState>, ctx: SessionContext) -> SidebarTemplate {
    let snapshot = ctx.snapshot().await;
    SidebarTemplate {
        display_name: ctx.user.display_name().to_string(),
        group_name: snapshot.data().and_then(|d| d.group_name.clone()),
        groups: filter_menu(&state.catalog, &snapshot),
    }
}
