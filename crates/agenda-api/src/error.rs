use agenda_core::error::CoreError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("end date must not precede start date")]
    InvalidRange,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Machine-readable error code string.
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidRange => "INVALID_RANGE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::InvalidRange => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!("API internal error: {err:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "code": code,
            "message": message,
            "error": message,
            "details": Value::Null,
        });

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidRange => ApiError::InvalidRange,
            CoreError::InvalidDayOfWeek(value) => {
                // Stored configuration is broken; the caller cannot fix it.
                tracing::error!(day_of_week = value, "event has malformed day_of_week");
                ApiError::Internal(anyhow::anyhow!("invalid day_of_week {value}"))
            }
            CoreError::InvalidDate(raw) => {
                ApiError::BadRequest(format!("invalid date or time: {raw}"))
            }
            CoreError::NotFound => ApiError::NotFound,
            CoreError::BadRequest(msg) => ApiError::BadRequest(msg),
            CoreError::Database(_) => ApiError::Internal(anyhow::anyhow!("database error")),
            CoreError::Internal(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<agenda_db::DbError> for ApiError {
    fn from(e: agenda_db::DbError) -> Self {
        match e {
            agenda_db::DbError::NotFound => ApiError::NotFound,
            agenda_db::DbError::Sqlx(_) => ApiError::Internal(anyhow::anyhow!("database error")),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
