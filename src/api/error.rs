use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::dto::ErrorResponse;
use crate::application::AppError;

/// Error returned by HTTP handlers. Wraps service errors and malformed
/// request bodies so both render as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::App(AppError::AccountNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::AccountAlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::App(AppError::InvalidAmount(_))
            | ApiError::App(AppError::InsufficientBalance { .. })
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::App(AppError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::App(AppError::AccountNotFound(_)) => "User not found".to_string(),
            ApiError::App(AppError::InsufficientBalance { .. }) => {
                "Insufficient points".to_string()
            }
            ApiError::App(AppError::Database(_)) => "Internal storage error".to_string(),
            ApiError::App(err) => err.to_string(),
            ApiError::BadRequest(detail) => detail.clone(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::App(AppError::Database(err)) = &self {
            error!("storage failure: {:#}", err);
        }
        let status = self.status();
        (status, Json(ErrorResponse { detail: self.detail() })).into_response()
    }
}
