use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::AppError;

/// Reason sent for a missing writeup or post.
pub const NOT_FOUND: &str = "Not found";

/// Reason sent when a challenge has no solution directory.
pub const SOLUTION_MISSING: &str = "Solution folder not found";

/// Reason sent when the solution directory holds no script.
pub const NO_SOLVER: &str = "No solver found";

/// Errors surfaced by the local API.
///
/// Every failure is a 404 with a fixed plain-text reason; filesystem
/// details never reach the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),
}

impl ApiError {
    /// Convert a backend error, logging anything that is not a plain absence.
    pub fn from_app(reason: &'static str, error: AppError) -> Self {
        if error.is_not_found() {
            log::debug!("{}: {}", reason, error);
        } else {
            log::warn!("{}: {}", reason, error);
        }
        Self::NotFound(reason)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        (status, self.to_string()).into_response()
    }
}
