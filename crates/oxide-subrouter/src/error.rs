//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
///
/// Building a [`Router`](crate::Router) tree never fails. Every error below
/// comes from the [`ServeMux`](crate::ServeMux) dispatch table, either while
/// a compiled route is registered or while a request is looked up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// The pattern could not be parsed.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern, as passed to the dispatch table.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The same method and path shape were registered twice.
    #[error("pattern {0:?} conflicts with an already registered pattern")]
    DuplicatePattern(String),

    /// No route matched the request.
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// A route matched the path but not the method.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed { method: String, path: String },
}

impl RouterError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
