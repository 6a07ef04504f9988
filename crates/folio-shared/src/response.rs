//! Standardized API response types.

use serde::{Deserialize, Serialize};

/// JSON error body: `{"error": "...", "status": 404}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message, safe to show to the caller.
    pub error: String,

    /// The HTTP status code.
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status,
        }
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, detail)
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Authentication required")
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, detail)
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(409, detail)
    }

    pub fn too_many_requests(retry_after_secs: u64) -> Self {
        Self::new(
            429,
            format!("Rate limit exceeded. Try again in {retry_after_secs} seconds."),
        )
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}
