pub mod api_error;
pub mod auth_client;
pub mod backend_client;
pub mod metrics;

pub use api_error::ApiError;
