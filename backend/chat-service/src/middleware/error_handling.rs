use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::error::AppError;

/// Uniform failure envelope. `retryable` tells polling clients whether a
/// bounded backoff retry is worthwhile; store-level detail never leaves the
/// server logs.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub retryable: bool,
}

pub fn map_error(err: &AppError) -> (StatusCode, ErrorBody) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody {
        success: false,
        error: err.public_message(),
        retryable: err.is_retryable(),
    };
    (status, body)
}

pub fn into_response(err: AppError) -> impl IntoResponse {
    if err.status_code() >= 500 {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::debug!(error = %err, "request rejected");
    }
    let (status, body) = map_error(&err);
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_message() {
        let (status, body) = map_error(&AppError::Validation("chat_id is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.error, "chat_id is required");
        assert!(!body.retryable);
    }

    #[test]
    fn database_detail_is_replaced_by_generic_message() {
        let (status, body) = map_error(&AppError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "internal server error");
        assert!(body.retryable);
    }

    #[test]
    fn envelope_serializes_success_false() {
        let (_, body) = map_error(&AppError::Unauthorized);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "invalid credentials");
    }
}
