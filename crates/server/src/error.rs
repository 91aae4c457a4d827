use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use pool::PoolError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Check error: {0}")]
    Check(#[from] PoolError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Check(pool_err) => match pool_err {
                PoolError::InvalidCheck(_) | PoolError::UnknownCategory(_) => {
                    StatusCode::BAD_REQUEST
                }
                PoolError::QueueFull { .. } => StatusCode::TOO_MANY_REQUESTS,
                PoolError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
                PoolError::Matcher(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PoolError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Check(pool_err) => match pool_err {
                PoolError::InvalidCheck(_) => "INVALID_CHECK",
                PoolError::UnknownCategory(_) => "UNKNOWN_CATEGORY",
                PoolError::QueueFull { .. } => "QUEUE_FULL",
                PoolError::Timeout { .. } => "CHECK_TIMEOUT",
                PoolError::Matcher(_) => "MATCHER_ERROR",
                PoolError::InvalidConfig(_) => "POOL_CONFIG_ERROR",
            },
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pool_errors_map_to_client_visible_statuses() {
        let cases = [
            (
                ServerError::Check(PoolError::UnknownCategory(vec!["x".into()])),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::Check(PoolError::QueueFull { capacity: 1 }),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ServerError::Check(PoolError::Timeout {
                    matcher_id: "m".into(),
                    duration: Duration::from_millis(500),
                }),
                StatusCode::REQUEST_TIMEOUT,
            ),
            (
                ServerError::Check(PoolError::Matcher("boom".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn matcher_message_survives_the_mapping() {
        let err = ServerError::Check(PoolError::Matcher("Something went wrong".into()));
        assert!(err.to_string().contains("Something went wrong"));
        assert_eq!(err.error_code(), "MATCHER_ERROR");
    }
}
