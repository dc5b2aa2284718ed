use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use service_core::middleware::tracing::request_id_middleware;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::SessionSettings;
use crate::handlers::{
    admin,
    app::health_check,
    auth::{login_handler, logout_handler},
    groups, menu, permissions,
};
use crate::middleware::metrics::metrics_middleware;
use crate::resources::{Groups, Plans, Users};
use crate::AppState;

pub fn build_router(state: AppState, session_settings: &SessionSettings) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(session_settings.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            session_settings.inactivity_hours,
        )));

    let admin_routes = Router::new()
        .route(
            "/plans",
            get(admin::list::<Plans>).post(admin::create::<Plans>),
        )
        .route(
            "/plans/:id",
            put(admin::update::<Plans>).delete(admin::delete::<Plans>),
        )
        .route("/plans/bulk-delete", post(admin::bulk_delete_plans))
        .route(
            "/users",
            get(admin::list::<Users>).post(admin::create::<Users>),
        )
        .route(
            "/users/:id",
            put(admin::update::<Users>).delete(admin::delete::<Users>),
        )
        .route("/groups", get(admin::list::<Groups>))
        .route("/groups/:id", delete(admin::delete::<Groups>))
        .route(
            "/groups/matrix",
            get(groups::matrix_rows).post(groups::open_matrix),
        )
        .route("/groups/matrix/toggle", post(groups::toggle))
        .route("/groups/matrix/toggle-all", post(groups::toggle_all))
        .route("/groups/matrix/save", post(groups::save));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(crate::handlers::metrics::metrics))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/me/permissions", get(permissions::me))
        .route("/me/permissions/refresh", post(permissions::refresh))
        .route("/menu", get(menu::menu))
        .route("/sidebar", get(menu::sidebar))
        .nest("/admin", admin_routes)
        .route_layer(from_fn(metrics_middleware))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        // Outermost, so the trace span sees the request ID
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
