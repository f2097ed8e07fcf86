//! Error Types
//!
//! Standardized error types shared across tessera services.

use serde::Serialize;
use thiserror::Error;

/// Standardized error type for tessera.
///
/// Each variant maps to a common failure scenario and converts cleanly to an
/// HTTP status code at the API boundary.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TesseraError {
    /// Authentication or authorization failure. Maps to HTTP 401.
    #[error("Unauthorized{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthorized {
        /// Optional message providing more context.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The authenticated caller lacks permission. Maps to HTTP 403.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of the missing permission.
        message: String,
    },

    /// Requested resource was not found. Maps to HTTP 404.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource that was not found (e.g., "User", "Application").
        resource: String,
        /// Optional identifier of the resource.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Input validation failure. Maps to HTTP 400.
    #[error("Validation error on field '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Description of the validation failure.
        message: String,
    },
}

/// Type alias for Results using [`TesseraError`].
pub type Result<T> = std::result::Result<T, TesseraError>;
