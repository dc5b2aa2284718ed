pub mod catalog;
pub mod config;
pub mod handlers;
pub mod matrix;
pub mod menu;
pub mod middleware;
pub mod models;
pub mod permissions;
pub mod resources;
pub mod services;
pub mod startup;

use catalog::MenuCatalog;
use permissions::{LoadPhase, PermissionStore, PermissionStores};
use secrecy::Secret;
use services::{
    auth_client::AuthClient,
    backend_client::{BackendClient, SessionBackend},
    metrics::record_permission_fetch,
};
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state: upstream clients, the menu catalog and the
/// per-session Permission Stores.
#[derive(Clone)]
pub struct AppState {
    pub auth_client: Arc<AuthClient>,
    pub backend: Arc<BackendClient>,
    pub catalog: Arc<MenuCatalog>,
    pub stores: Arc<PermissionStores>,
}

impl AppState {
    pub fn new(auth_client: Arc<AuthClient>, backend: Arc<BackendClient>) -> Self {
        Self {
            auth_client,
            backend,
            catalog: Arc::new(MenuCatalog::standard()),
            stores: Arc::new(PermissionStores::new()),
        }
    }

    /// Create and register a Permission Store for `credential`, then populate it.
    pub async fn load_permission_store(
        &self,
        credential: Secret<String>,
    ) -> (Uuid, Arc<PermissionStore>) {
        let key = Uuid::new_v4();
        let store = self.restore_permission_store(key, credential).await;
        (key, store)
    }

    /// Permission Store registered under `key`, recreated and populated if it was evicted.
    ///
    /// Concurrent requests of one session share the recreated store; a store that has
    /// not finished its first load is fetched again rather than served empty.
    pub async fn restore_permission_store(
        &self,
        key: Uuid,
        credential: Secret<String>,
    ) -> Arc<PermissionStore> {
        let (store, created) = self.stores.get_or_insert_with(key, || {
            let source = Arc::new(SessionBackend::new(self.backend.clone(), credential));
            Arc::new(PermissionStore::new(source))
        });

        if created || store.snapshot().await.phase() != LoadPhase::Ready {
            let outcome = store.fetch_permissions().await;
            record_permission_fetch(outcome.as_str());
        }
        store
    }
}
