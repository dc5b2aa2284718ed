use axum::extract::FromRequest;
use service_core::error::AppError;

/// `Json` whose rejections use the service's error body instead of plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
