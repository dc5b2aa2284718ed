use crate::config::AuthSettings;
use crate::models::SessionUser;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::time::Duration;

use super::api_error::{ensure_success, ApiError};
use super::metrics::record_backend_call;

pub struct AuthClient {
    client: Client,
    settings: AuthSettings,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Successful sign-in: the session credential and the account it belongs to.
#[derive(Deserialize)]
pub struct AuthSession {
    pub token: Secret<String>,
    pub user: SessionUser,
}

impl AuthClient {
    pub fn new(settings: AuthSettings) -> Result<Self, ApiError> {
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
        format!("{}{}", self.settings.url.trim_end_matches('/'), path)
    }

    /// Exchange email and password for a session credential.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<AuthSession, ApiError> {
        let url = self.url("/api/auth/sign-in/email");
        let result = async {
            let response = self
                .client
                .traced_post(&url)
                .json(&SignInRequest {
                    email,
                    password: password.expose_secret(),
                })
                .send()
                .await
                .map_err(|source| ApiError::Transport {
                    operation: "sign_in",
                    source,
                })?;

            ensure_success(response)
                .await?
                .json::<AuthSession>()
                .await
                .map_err(|source| ApiError::Decode {
                    operation: "sign_in",
                    source,
                })
        }
        .await;

        record_backend_call("sign_in", if result.is_ok() { "ok" } else { "error" });
        result
    }

    /// Revoke the credential with the provider.
    pub async fn sign_out(&self, credential: &Secret<String>) -> Result<(), ApiError> {
        let url = self.url("/api/auth/sign-out");
        let result = match self
            .client
            .traced_post(&url)
            .credential(&self.settings.session_cookie, credential)
            .send()
            .await
        {
            Ok(response) => ensure_success(response).await.map(|_| ()),
            Err(source) => Err(ApiError::Transport {
                operation: "sign_out",
                source,
            }),
        };

        record_backend_call("sign_out", if result.is_ok() { "ok" } else { "error" });
        result
    }
}
