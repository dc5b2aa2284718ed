use async_trait::async_trait;
use reqwest::Client;
use secrecy::Secret;
use serde::{de::DeserializeOwned, Serialize};
use service_core::observability::{TracedClientExt, TracedRequest};
use std::sync::Arc;
use std::time::Duration;

use super::api_error::{ensure_success, ApiError};
use super::metrics::record_backend_call;
use crate::config::BackendSettings;
use crate::models::{BulkDeleteRequest, ListEnvelope};
use crate::permissions::{PermissionSource, SessionPermissions};
use crate::resources::{AdminResource, Plans};

/// Client for the PMS backend API. Every call carries the caller's session credential.
pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.settings.url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: TracedRequest, credential: &Secret<String>) -> TracedRequest {
        request.credential(&self.settings.session_cookie, credential)
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: TracedRequest,
    ) -> Result<reqwest::Response, ApiError> {
        let result = match request.send().await {
            Ok(response) => ensure_success(response).await,
            Err(source) => Err(ApiError::Transport { operation, source }),
        };

        match &result {
            Ok(_) => record_backend_call(operation, "ok"),
            Err(e) => {
                tracing::warn!(operation, error = %e, "Backend call failed");
                record_backend_call(operation, "error");
            }
        }
        result
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { operation, source })
    }

    /// `GET /api/me/permissions`
    pub async fn session_permissions(
        &self,
        credential: &Secret<String>,
    ) -> Result<SessionPermissions, ApiError> {
        let request = self.authorized(
            self.client.traced_get(&self.url("me/permissions")),
            credential,
        );
        let response = self.execute("session_permissions", request).await?;
        Self::decode("session_permissions", response).await
    }

    pub async fn list<R: AdminResource>(
        &self,
        credential: &Secret<String>,
    ) -> Result<Vec<R::Item>, ApiError> {
        let request = self.authorized(self.client.traced_get(&self.url(R::NAME)), credential);
        let response = self.execute("list", request).await?;
        let envelope: ListEnvelope<R::Item> = Self::decode("list", response).await?;
        Ok(envelope.data)
    }

    pub async fn create<R: AdminResource, B: Serialize + ?Sized>(
        &self,
        credential: &Secret<String>,
        body: &B,
    ) -> Result<R::Item, ApiError> {
        tracing::info!(resource = R::NAME, "Creating record");
        let request = self
            .authorized(self.client.traced_post(&self.url(R::NAME)), credential)
            .json(body);
        let response = self.execute("create", request).await?;
        Self::decode("create", response).await
    }

    pub async fn update<R: AdminResource, B: Serialize + ?Sized>(
        &self,
        credential: &Secret<String>,
        id: &str,
        body: &B,
    ) -> Result<R::Item, ApiError> {
        tracing::info!(resource = R::NAME, id, "Updating record");
        let path = format!("{}/{}", R::NAME, id);
        let request = self
            .authorized(self.client.traced_put(&self.url(&path)), credential)
            .json(body);
        let response = self.execute("update", request).await?;
        Self::decode("update", response).await
    }

    pub async fn delete<R: AdminResource>(
        &self,
        credential: &Secret<String>,
        id: &str,
    ) -> Result<(), ApiError> {
        tracing::info!(resource = R::NAME, id, "Deleting record");
        let path = format!("{}/{}", R::NAME, id);
        let request = self.authorized(self.client.traced_delete(&self.url(&path)), credential);
        self.execute("delete", request).await?;
        Ok(())
    }

    /// `POST /api/plans/bulk-delete`
    pub async fn bulk_delete_plans(
        &self,
        credential: &Secret<String>,
        request: &BulkDeleteRequest,
    ) -> Result<(), ApiError> {
        tracing::info!(count = request.ids.len(), "Bulk deleting plans");
        let path = format!("{}/bulk-delete", Plans::NAME);
        let traced = self
            .authorized(self.client.traced_post(&self.url(&path)), credential)
            .json(request);
        self.execute("bulk_delete", traced).await?;
        Ok(())
    }
}

/// Permission source bound to one session's credential.
pub struct SessionBackend {
    backend: Arc<BackendClient>,
    credential: Secret<String>,
}

impl SessionBackend {
    pub fn new(backend: Arc<BackendClient>, credential: Secret<String>) -> Self {
        Self {
            backend,
            credential,
        }
    }
}

#[async_trait]
impl PermissionSource for SessionBackend {
    async fn fetch_session_permissions(&self) -> Result<SessionPermissions, ApiError> {
        self.backend.session_permissions(&self.credential).await
    }
}
