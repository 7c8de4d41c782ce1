//! Error taxonomy shared by the use cases and the HTTP boundary.

use axum::http::StatusCode;

/// Errors surfaced by the item and inventory use cases.
///
/// Each variant maps 1:1 onto an HTTP status code at the transport layer.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// Reserved; no current workflow produces it.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::Unauthorized(m)
            | AppError::Internal(m) => m,
        }
    }
}

// Storage failures are opaque to callers.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::Internal("request timed out".to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Integrity constraints the repositories report as typed errors, wrapped
/// in the `anyhow::Error` they return.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error("item {0} already has an inventory record")]
    ItemAlreadyStocked(String),
    #[error("item {0} is still referenced by an inventory record")]
    ItemStillStocked(String),
}

impl ConstraintViolation {
    pub fn find(err: &anyhow::Error) -> Option<&ConstraintViolation> {
        err.downcast_ref::<ConstraintViolation>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_mirror_variants() {
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_errors_become_internal() {
        let err: AppError = anyhow::anyhow!("connection refused").into();
        assert_eq!(err, AppError::Internal("connection refused".to_string()));
    }

    #[test]
    fn constraint_violations_survive_anyhow() {
        let err = anyhow::Error::new(ConstraintViolation::ItemStillStocked("i-1".into()));
        assert_eq!(
            ConstraintViolation::find(&err),
            Some(&ConstraintViolation::ItemStillStocked("i-1".into()))
        );
        assert_eq!(ConstraintViolation::find(&anyhow::anyhow!("timeout")), None);
    }
}
