//! Shared HTTP error envelope for Fuisor backend services
//!
//! Every service serializes failures into the same JSON shape so API clients
//! and the gateway can handle errors uniformly:
//!
//! ```json
//! {
//!   "error": "Internal Server Error",
//!   "message": "Database error: connection refused",
//!   "status": 500,
//!   "error_type": "server_error",
//!   "code": "DATABASE_ERROR",
//!   "timestamp": "2026-01-01T00:00:00Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uniform error response body returned by all services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short human-readable title matching the HTTP status ("Not Found", ...)
    pub error: String,
    /// Detailed message safe to show to API clients
    pub message: String,
    /// HTTP status code, duplicated in the body for logging pipelines
    pub status: u16,
    /// Coarse category: validation_error, authentication_error,
    /// authorization_error, not_found_error, conflict_error, server_error
    pub error_type: String,
    /// Stable machine-readable code from [`error_codes`]
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Stable machine-readable error codes shared across services.
pub mod error_codes {
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
    pub const UPSTREAM_UNAVAILABLE: &str = "UPSTREAM_UNAVAILABLE";
}
