//! # Router Errors
//!
//! Two families of errors:
//!
//! - [`RouterError`]: the outcome of a single dispatch. Router-detected errors
//!   (`RouteNotFound`, `MethodNotAllowed`) never reach a handler; handler
//!   domain errors are carried through unchanged in meaning; anything else is
//!   `Internal`.
//! - [`ConfigError`]: problems found while building the router. These are
//!   fatal to startup.

use crate::capability::HttpMethod;
use serde::Serialize;
use std::fmt;

/// Machine-readable error category placed in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    RouteNotFound,
    MethodNotAllowed,
    ValidationError,
    NotFound,
    Forbidden,
    InternalError,
    Cancelled,
}

impl ErrorKind {
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::RouteNotFound => 404,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::ValidationError => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::InternalError => 500,
            // Client closed request.
            ErrorKind::Cancelled => 499,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RouteNotFound => "RouteNotFound",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::InternalError => "InternalError",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message returned in place of any unexpected failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Errors produced while dispatching a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("No route matches {method} {path}")]
    RouteNotFound { method: String, path: String },
    #[error(
        "The {method} method is not allowed for this resource. The accepted methods are: {}",
        join_methods(.allowed)
    )]
    MethodNotAllowed {
        method: String,
        allowed: Vec<HttpMethod>,
    },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Internal(String),
    #[error("The request was cancelled")]
    Cancelled,
}

impl RouterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouterError::RouteNotFound { .. } => ErrorKind::RouteNotFound,
            RouterError::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            RouterError::Validation(_) => ErrorKind::ValidationError,
            RouterError::NotFound(_) => ErrorKind::NotFound,
            RouterError::Forbidden(_) => ErrorKind::Forbidden,
            RouterError::Internal(_) => ErrorKind::InternalError,
            RouterError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn status(&self) -> u16 {
        self.kind().status()
    }

    /// An internal error with the generic, non-revealing message.
    pub fn internal() -> Self {
        RouterError::Internal(INTERNAL_ERROR_MESSAGE.to_string())
    }
}

fn join_methods(methods: &[HttpMethod]) -> String {
    methods
        .iter()
        .map(|method| method.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors detected while building a router. Any of these prevents startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Resource registered more than once: {0}")]
    DuplicateResource(String),
    #[error("Invalid resource name: {0:?}")]
    InvalidResourceName(String),
    #[error("Configuration names an unregistered resource: {0}")]
    UnknownResource(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
    #[error("Unable to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid custom endpoint path for {resource}: {path}")]
    InvalidCustomPath { resource: String, path: String },
    #[error("Route defined twice: {method} {path}")]
    ConflictingRoute { method: HttpMethod, path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_lists_every_accepted_method() {
        let error = RouterError::MethodNotAllowed {
            method: "PATCH".to_string(),
            allowed: vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Search],
        };

        assert_eq!(
            error.to_string(),
            "The PATCH method is not allowed for this resource. \
             The accepted methods are: GET, POST, SEARCH"
        );
        assert_eq!(error.status(), 405);
    }

    #[test]
    fn test_internal_error_hides_details() {
        let error = RouterError::internal();
        assert_eq!(error.to_string(), INTERNAL_ERROR_MESSAGE);
        assert_eq!(error.status(), 500);
    }
}
