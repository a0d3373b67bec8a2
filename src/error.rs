// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Health data access was not granted (or was revoked).
    #[error("Health data authorization failed: {0}")]
    HealthAuthorization(String),

    /// A workout query against the health store could not complete.
    #[error("Health store query failed: {0}")]
    HealthQuery(String),

    /// Route or sample retrieval failed for a single workout.
    #[error("Route extraction failed: {0}")]
    RouteExtraction(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Weather history error: {0}")]
    Weather(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors that end the session until access is re-granted.
    pub fn is_authorization_error(&self) -> bool {
        matches!(self, AppError::HealthAuthorization(_))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::HealthAuthorization(msg) => (
                StatusCode::FORBIDDEN,
                "health_authorization",
                Some(msg.clone()),
            ),
            AppError::HealthQuery(msg) => {
                (StatusCode::BAD_GATEWAY, "health_query", Some(msg.clone()))
            }
            AppError::RouteExtraction(msg) => (
                StatusCode::BAD_GATEWAY,
                "route_extraction",
                Some(msg.clone()),
            ),
            AppError::Geocoding(msg) => {
                (StatusCode::BAD_GATEWAY, "geocoding_error", Some(msg.clone()))
            }
            AppError::Weather(msg) => {
                (StatusCode::BAD_GATEWAY, "weather_error", Some(msg.clone()))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for services and handlers
pub type Result<T> = std::result::Result<T, AppError>;
