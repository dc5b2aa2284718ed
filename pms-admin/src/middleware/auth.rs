use anyhow::anyhow;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use secrecy::Secret;
use service_core::error::AppError;
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use crate::models::SessionUser;
use crate::permissions::{Capability, PermissionSnapshot, PermissionStore};
use crate::resources::AdminResource;
use crate::AppState;

pub const CREDENTIAL_KEY: &str = "credential";
pub const USER_KEY: &str = "user";
pub const STORE_KEY: &str = "permission_store";
pub const MATRIX_KEY: &str = "group_matrix";

pub(crate) fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow!("session store: {}", err))
}

/// Signed-in session: the account, its credential and its Permission Store.
///
/// Rejects with 401 when the browser session has not signed in.
pub struct SessionContext {
    pub session: Session,
    pub user: SessionUser,
    credential: Secret<String>,
    store: Arc<PermissionStore>,
}

impl SessionContext {
    pub fn credential(&self) -> &Secret<String> {
        &self.credential
    }

    pub fn store(&self) -> &Arc<PermissionStore> {
        &self.store
    }

    pub async fn snapshot(&self) -> PermissionSnapshot {
        self.store.snapshot().await
    }

    /// Require `capability` on the resource's menu pair (`None` checks visibility only).
    pub async fn authorize<R: AdminResource>(
        &self,
        capability: Option<Capability>,
    ) -> Result<PermissionSnapshot, AppError> {
        let snapshot = self.snapshot().await;
        if snapshot.allows(R::MAIN_MENU, R::SUB_MENU, capability) {
            return Ok(snapshot);
        }

        let action = capability.map(Capability::as_str).unwrap_or("view");
        tracing::warn!(
            user_id = %self.user.id,
            main_menu = R::MAIN_MENU,
            sub_menu = R::SUB_MENU,
            action,
            "Permission denied"
        );
        Err(AppError::Forbidden(anyhow!(
            "You do not have {} access to {} / {}",
            action,
            R::MAIN_MENU,
            R::SUB_MENU
        )))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::InternalError(anyhow!(msg)))?;

        let credential: Option<String> =
            session.get(CREDENTIAL_KEY).await.map_err(session_error)?;
        let user: Option<SessionUser> = session.get(USER_KEY).await.map_err(session_error)?;

        let (Some(credential), Some(user)) = (credential, user) else {
            return Err(AppError::Unauthorized(anyhow!("Sign in required")));
        };
        let credential = Secret::new(credential);

        // Stores idle past the inactivity window are evicted; a session that is still
        // alive gets its store back under the key it already holds.
        let store = match session.get::<Uuid>(STORE_KEY).await.map_err(session_error)? {
            Some(key) => match state.stores.get(&key) {
                Some(store) => store,
                None => {
                    tracing::info!(user_id = %user.id, "Rebuilding permission store for session");
                    state.restore_permission_store(key, credential.clone()).await
                }
            },
            None => {
                let (key, store) = state.load_permission_store(credential.clone()).await;
                session.insert(STORE_KEY, key).await.map_err(session_error)?;
                store
            }
        };

        tracing::Span::current().record("user_id", user.id.as_str());

        Ok(SessionContext {
            session,
            user,
            credential,
            store,
        })
    }
}
