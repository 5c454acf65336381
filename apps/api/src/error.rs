use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use openbook_core::AppError;
use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, self.0.to_string()),
            AppError::UpstreamUnavailable(detail) => {
                warn!(%detail, "upstream unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service temporarily unavailable".to_owned(),
                )
            }
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
