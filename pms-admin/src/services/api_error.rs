use reqwest::{Response, StatusCode};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::is_auth_failure;
use thiserror::Error;

/// Failure of a call to the PMS backend or the authentication provider.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response; `message` is the upstream's own explanation.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{operation} returned an unexpected body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Rejected { status, .. } if is_auth_failure(*status))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Pass 2xx responses through; turn anything else into [`ApiError::Rejected`]
/// carrying the body's `message`, or the status reason when there is none.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            message: Some(message),
        }) if !message.trim().is_empty() => message,
        _ => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    Err(ApiError::Rejected { status, message })
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { status, message } => AppError::Upstream { status, message },
            ApiError::Transport { .. } | ApiError::Decode { .. } => {
                AppError::BadGateway(err.to_string())
            }
            ApiError::Client(source) => AppError::InternalError(anyhow::Error::new(source)),
        }
    }
}
