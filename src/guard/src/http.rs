//! Axum integration: authorization errors as HTTP rejections

use crate::error::AuthzError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl AuthzError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthzError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthzError::PolicyNotFound { .. } => "policy_not_found",
            AuthzError::ActionNotFound { .. } => "action_not_found",
            AuthzError::NotAuthorized { .. } => "not_authorized",
            AuthzError::PolicyNotApplied(_) => "policy_not_applied",
            AuthzError::HandlerNotFound { .. } => "handler_not_found",
            AuthzError::TargetMismatch { .. } => "target_mismatch",
            AuthzError::InvalidConfig(_) => "invalid_config",
            AuthzError::Registry(_) => "registry_error",
        }
    }
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Authorization setup failure: {}", self);
        }

        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
