//! Error types and handling for the route table and its server.
//!
//! This module uses an opaque `Error` struct paired with an `ErrorKind` enum,
//! following the `std::io::Error` pattern. Errors carry a stable error code and
//! an HTTP status, and convert into structured JSON responses.
//!
//! # Example
//!
//! ```rust
//! use page_routes::{Error, ErrorKind};
//! use axum::http::StatusCode;
//!
//! let error = Error::not_found("No route for GET /missing");
//!
//! match error.kind() {
//!     ErrorKind::NotFound => assert_eq!(error.status_code(), StatusCode::NOT_FOUND),
//!     _ => unreachable!(),
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
///
/// Marked `#[non_exhaustive]`; always include a wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A route with the same method and path, or the same name, already exists.
    #[error("duplicate route")]
    DuplicateRoute,

    /// No route matches the requested method and path.
    #[error("not found")]
    NotFound,

    /// A route references a guard that was never registered.
    #[error("unknown guard")]
    UnknownGuard,

    /// Configuration error (invalid TOML, missing values).
    #[error("configuration error")]
    Configuration,

    /// I/O error (file operations, network).
    #[error("I/O error")]
    Io,

    /// Invalid input (bad path pattern, header, request data).
    #[error("invalid input")]
    InvalidInput,

    /// Internal/unexpected error.
    #[error("internal error")]
    Internal,
}

/// An error that can occur while building or serving the route table.
///
/// Use [`Error::kind()`] to match on the category and `Display` for a
/// human-readable message.
///
/// ```rust
/// use page_routes::{Error, ErrorKind};
///
/// let err = Error::duplicate_route("GET /dashboard is already registered");
/// assert_eq!(err.kind(), ErrorKind::DuplicateRoute);
/// assert_eq!(err.error_code(), "DUPLICATE_ROUTE");
/// ```
pub struct Error {
    kind: ErrorKind,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    /// Creates a new error with the given kind and source.
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            source: error.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error code string for this error.
    ///
    /// This is a stable identifier suitable for client-side error handling.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ErrorKind::DuplicateRoute => "DUPLICATE_ROUTE",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UnknownGuard => "UNKNOWN_GUARD",
            ErrorKind::Configuration => "CONFIG_ERROR",
            ErrorKind::Io => "IO_ERROR",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::DuplicateRoute => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UnknownGuard => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into a structured error response.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.to_string())
    }

    /// Consumes the error and returns the inner error source.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.source
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Error {
    /// Creates a duplicate route error.
    pub fn duplicate_route(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateRoute, msg.into())
    }

    /// Creates a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg.into())
    }

    /// Creates an unknown guard error.
    pub fn unknown_guard(guard: impl AsRef<str>) -> Self {
        Self::new(
            ErrorKind::UnknownGuard,
            format!("Guard '{}' is not registered", guard.as_ref()),
        )
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg.into())
    }

    /// Creates an I/O error from a message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, msg.into())
    }

    /// Creates an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, msg.into())
    }

    /// Creates an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg.into())
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = self.to_error_response();

        // Unmatched requests are routine; keep them out of the error log
        if self.kind == ErrorKind::NotFound {
            tracing::debug!(message = %error_response.message, "Route not found");
        } else {
            tracing::error!(
                error_code = %error_response.error_code,
                message = %error_response.message,
                status = %status.as_u16(),
                "Error occurred"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

// ============================================================================
// From implementations
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::new(ErrorKind::InvalidInput, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Internal, err)
    }
}

impl From<matchit::InsertError> for Error {
    fn from(err: matchit::InsertError) -> Self {
        match err {
            matchit::InsertError::Conflict { .. } => Self::new(ErrorKind::DuplicateRoute, err),
            _ => Self::new(ErrorKind::InvalidInput, err),
        }
    }
}

// ============================================================================
// ErrorResponse
// ============================================================================

/// Structured error response with error code and details.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Unique error code for client-side error handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Adds details to the error response.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(format!("{}", ErrorKind::DuplicateRoute), "duplicate route");
        assert_eq!(format!("{}", ErrorKind::NotFound), "not found");
        assert_eq!(format!("{}", ErrorKind::UnknownGuard), "unknown guard");
    }

    #[test]
    fn test_error_new() {
        let err = Error::new(ErrorKind::Internal, "test error");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(format!("{}", err), "test error");
    }

    #[test]
    fn test_unknown_guard_message_names_guard() {
        let err = Error::unknown_guard("verified");
        assert_eq!(err.kind(), ErrorKind::UnknownGuard);
        assert!(err.to_string().contains("'verified'"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::duplicate_route("x").error_code(), "DUPLICATE_ROUTE");
        assert_eq!(Error::not_found("x").error_code(), "NOT_FOUND");
        assert_eq!(Error::unknown_guard("x").error_code(), "UNKNOWN_GUARD");
        assert_eq!(Error::config("x").error_code(), "CONFIG_ERROR");
        assert_eq!(Error::io("x").error_code(), "IO_ERROR");
        assert_eq!(Error::invalid_input("x").error_code(), "INVALID_INPUT");
        assert_eq!(Error::internal("x").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::duplicate_route("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(Error::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::invalid_input("x").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: Error = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = "invalid".parse::<toml::Value>().unwrap_err();
        let err: Error = toml_err.into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_matchit_conflict_is_duplicate_route() {
        let mut router = matchit::Router::new();
        router.insert("/users/{id}", ()).unwrap();
        let err: Error = router.insert("/users/{name}", ()).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::DuplicateRoute);
    }

    #[test]
    fn test_from_matchit_malformed_is_invalid_input() {
        let mut router = matchit::Router::new();
        let err: Error = router.insert("/users/{id", ()).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_not_found_into_response_is_json_404() {
        let response = Error::not_found("No route for GET /nope").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error_code"], "NOT_FOUND");
        assert_eq!(json["message"], "No route for GET /nope");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let response = ErrorResponse::new("CODE", "message").with_details("extra info");
        assert_eq!(response.details, Some("extra info".to_string()));
    }

    #[test]
    fn test_error_source_trait() {
        let err = Error::internal("test");
        assert!(StdError::source(&err).is_some());
        assert_eq!(format!("{}", err.into_inner()), "test");
    }
}
