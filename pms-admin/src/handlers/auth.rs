use anyhow::anyhow;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;
use uuid::Uuid;
use validator::Validate;

use super::permissions::PermissionsView;
use crate::middleware::auth::{session_error, CREDENTIAL_KEY, MATRIX_KEY, STORE_KEY, USER_KEY};
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub password: Secret<String>,
}

fn hx_redirect(location: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("HX-Redirect", HeaderValue::from_static(location));
    headers
}

/// Sign in, then create and populate this session's Permission Store.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let auth = state
        .auth_client
        .sign_in(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            tracing::warn!(email = %payload.email, error = %e, "Sign-in failed");
            if e.status().is_some_and(|status| status.is_client_error()) {
                AppError::Unauthorized(anyhow!("Invalid email or password"))
            } else {
                e.into()
            }
        })?;

    // A previous sign-in on this browser session leaves a store and possibly an open
    // matrix draft behind; neither belongs to the new account.
    if let Some(previous) = session.get::<Uuid>(STORE_KEY).await.map_err(session_error)? {
        state.stores.remove(&previous);
    }
    session
        .remove_value(MATRIX_KEY)
        .await
        .map_err(session_error)?;
    session.cycle_id().await.map_err(session_error)?;

    let (store_key, store) = state.load_permission_store(auth.token.clone()).await;

    session
        .insert(CREDENTIAL_KEY, auth.token.expose_secret())
        .await
        .map_err(session_error)?;
    session
        .insert(USER_KEY, &auth.user)
        .await
        .map_err(session_error)?;
    session
        .insert(STORE_KEY, store_key)
        .await
        .map_err(session_error)?;

    let snapshot = store.snapshot().await;
    tracing::info!(
        user_id = %auth.user.id,
        email = %auth.user.email,
        role = snapshot.role().map(|r| r.as_str()).unwrap_or("none"),
        "User logged in successfully"
    );

    Ok((
        StatusCode::OK,
        hx_redirect("/dashboard"),
        Json(PermissionsView::new(auth.user, &snapshot)),
    ))
}

/// Sign out. The session is cleared even when the provider cannot be reached.
pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    if let Some(credential) = session
        .get::<String>(CREDENTIAL_KEY)
        .await
        .map_err(session_error)?
    {
        if let Err(e) = state.auth_client.sign_out(&Secret::new(credential)).await {
            tracing::error!(error = %e, "Failed to revoke session during logout");
        } else {
            tracing::info!("Session revoked successfully");
        }
    }

    if let Some(key) = session.get::<Uuid>(STORE_KEY).await.map_err(session_error)? {
        if let Some(store) = state.stores.remove(&key) {
            store.clear().await;
        }
    }

    // Drops the credential, the store key and any open matrix draft.
    session.clear().await;

    Ok((StatusCode::OK, hx_redirect("/login"), ""))
}
