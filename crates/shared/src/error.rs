//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every domain module defines its own error enum and converts into this
/// taxonomy at the boundary, so callers see one stable set of outward codes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation before any state change.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found (or deliberately hidden, e.g. unlisted products).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (e.g., duplicate entry, repeat purchase).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller is not allowed to act on this resource.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Status transition rejected by policy or lost to a concurrent writer.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// External collaborator (payment, storage) failure, propagated as-is.
    #[error("External service error: {0}")]
    External(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) | Self::PolicyViolation(_) => 409,
            Self::Forbidden(_) => 403,
            Self::External(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::PolicyViolation(_) => "POLICY_VIOLATION",
            Self::External(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
