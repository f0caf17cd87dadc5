// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No credential provided")]
    MissingCredential,

    #[error("Invalid or expired credential")]
    InvalidCredential,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Profile store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Upstream error: {detail}")]
    UpstreamError { status: Option<u16>, detail: String },

    #[error("Upstream returned an empty reply")]
    EmptyUpstreamReply,

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether a caller could reasonably retry the failed operation.
    ///
    /// Nothing in the gateway retries automatically; this only classifies.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable(_) | AppError::UpstreamError { .. }
        )
    }

    /// Short machine-readable kind, used as the `error` field of responses
    /// and of per-row batch failures.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingCredential => "missing_credential",
            AppError::InvalidCredential => "invalid_credential",
            AppError::NotFound(_) => "not_found",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::UpstreamError { .. } => "upstream_error",
            AppError::EmptyUpstreamReply => "empty_upstream_reply",
            AppError::MalformedInput(_) => "malformed_input",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// Body extraction failures (bad JSON, wrong field types, missing
/// `Content-Type`) are caller mistakes, reported like any other bad input.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
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
        let (status, details) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone())),
            AppError::MissingCredential => (StatusCode::FORBIDDEN, None),
            AppError::InvalidCredential => (StatusCode::UNAUTHORIZED, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(msg.clone())),
            AppError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Profile store error");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(msg.clone()))
            }
            AppError::UpstreamError { status, detail } => {
                tracing::error!(upstream_status = ?status, detail = %detail, "Upstream error");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(detail.clone()))
            }
            AppError::EmptyUpstreamReply => {
                tracing::warn!("Upstream returned an empty reply");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some("Upstream reply was empty".to_string()),
                )
            }
            AppError::MalformedInput(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorResponse {
            error: self.kind().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
