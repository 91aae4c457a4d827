//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the
//! checkpool server. Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and metadata
//! - `check`: Document checking against the matcher pool
//! - `categories`: Category coverage reporting

pub mod categories;
pub mod check;
pub mod health;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Checkpool Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/check",
            "/api/v1/categories",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
