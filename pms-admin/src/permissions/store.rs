//! Per-session permission store.
//!
//! Lifecycle: `Uninitialized -> Loading -> Ready`, re-entering `Loading` only on
//! an explicit refetch. Any failed fetch leaves the store `Ready` with no data,
//! which every query reads as "no access".

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::model::{Capability, PermissionFlags, Role, SessionPermissions};
use super::resolver::Resolver;
use crate::services::api_error::ApiError;

/// Where a store loads the session's effective permissions from.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn fetch_session_permissions(&self) -> Result<SessionPermissions, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Uninitialized,
    Loading,
    Ready,
}

/// What a call to [`PermissionStore::fetch_permissions`] did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Empty,
    /// A newer fetch was issued while this one was in flight; its result was dropped.
    Superseded,
}

impl FetchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchOutcome::Loaded => "loaded",
            FetchOutcome::Empty => "empty",
            FetchOutcome::Superseded => "superseded",
        }
    }
}

struct StoreState {
    phase: LoadPhase,
    data: Option<Arc<SessionPermissions>>,
    latest_request: u64,
}

pub struct PermissionStore {
    source: Arc<dyn PermissionSource>,
    state: RwLock<StoreState>,
}

impl PermissionStore {
    pub fn new(source: Arc<dyn PermissionSource>) -> Self {
        Self {
            source,
            state: RwLock::new(StoreState {
                phase: LoadPhase::Uninitialized,
                data: None,
                latest_request: 0,
            }),
        }
    }

    /// Load the session's permissions, replacing whatever the store held.
    ///
    /// Each call takes a request token; a response is applied only if its token
    /// is still the latest when it arrives.
    pub async fn fetch_permissions(&self) -> FetchOutcome {
        let token = {
            let mut state = self.state.write().await;
            state.latest_request += 1;
            state.phase = LoadPhase::Loading;
            state.latest_request
        };

        let result = self.source.fetch_session_permissions().await;

        let mut state = self.state.write().await;
        if state.latest_request != token {
            tracing::debug!(
                token,
                latest = state.latest_request,
                "Discarding stale permission response"
            );
            return FetchOutcome::Superseded;
        }

        state.phase = LoadPhase::Ready;
        match result {
            Ok(permissions) => {
                tracing::debug!(
                    role = permissions.role.as_str(),
                    menus = permissions.menus.len(),
                    "Session permissions loaded"
                );
                state.data = Some(Arc::new(permissions));
                FetchOutcome::Loaded
            }
            Err(e) => {
                if e.is_auth_failure() {
                    tracing::warn!(error = %e, "Permission fetch rejected; continuing without access");
                } else {
                    tracing::warn!(error = %e, "Permission fetch failed; continuing without access");
                }
                state.data = None;
                FetchOutcome::Empty
            }
        }
    }

    /// Drop the held permissions, e.g. on sign-out. In-flight fetches are discarded.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.latest_request += 1;
        state.phase = LoadPhase::Ready;
        state.data = None;
    }

    pub async fn snapshot(&self) -> PermissionSnapshot {
        let state = self.state.read().await;
        PermissionSnapshot {
            phase: state.phase,
            data: state.data.clone(),
        }
    }
}

/// Point-in-time view of a store; all queries on it are synchronous.
#[derive(Debug, Clone)]
pub struct PermissionSnapshot {
    phase: LoadPhase,
    data: Option<Arc<SessionPermissions>>,
}

impl PermissionSnapshot {
    pub fn new(phase: LoadPhase, data: Option<SessionPermissions>) -> Self {
        Self {
            phase,
            data: data.map(Arc::new),
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn data(&self) -> Option<&SessionPermissions> {
        self.data.as_deref()
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.data())
    }

    pub fn role(&self) -> Option<Role> {
        self.data().map(|d| d.role)
    }

    pub fn is_admin(&self) -> bool {
        self.resolver().is_admin()
    }

    pub fn has_menu_access(&self, main_menu: &str, sub_menu: Option<&str>) -> bool {
        self.resolver().has_menu_access(main_menu, sub_menu)
    }

    pub fn get_permissions(&self, main_menu: &str, sub_menu: &str) -> PermissionFlags {
        self.resolver().get_permissions(main_menu, sub_menu)
    }

    pub fn allows(&self, main_menu: &str, sub_menu: &str, capability: Option<Capability>) -> bool {
        self.resolver().allows(main_menu, sub_menu, capability)
    }
}
