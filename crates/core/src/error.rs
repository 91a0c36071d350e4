//! Service error model.
//!
//! Callers of the unit service only ever observe one of three kinds. Errors
//! are compared by tag (`ServiceError::kind`), never by identity.

use thiserror::Error;

/// Result type used across the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error classification exposed to callers and metrics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The resource is absent, or the caller is not allowed to see it.
    NotFound,
    /// Malformed input, detected at the transport boundary.
    BadRequest,
    /// Any unexpected collaborator failure.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Internal => "internal",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level error.
///
/// `NotFound` intentionally covers both "does not exist" and "exists but the
/// caller is not a member of its class".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("the requested resource could not be found, or the caller is not allowed to view it")]
    NotFound,

    #[error("request is malformed or invalid: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound => ErrorKind::NotFound,
            ServiceError::BadRequest(_) => ErrorKind::BadRequest,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }
}
