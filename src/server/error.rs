use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cine_core::Error;

/// JSON error body for the `/api` routes.
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::BAD_GATEWAY);
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "upstream request failed");
        }

        let body = Json(serde_json::json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
            "retryable": self.0.is_retryable(),
        }));
        (status, body).into_response()
    }
}

/// Template failures are bugs, not user errors; log and return a bare 500.
pub fn render_failure(err: anyhow::Error) -> Response {
    tracing::error!("Template rendering failed: {:#}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
