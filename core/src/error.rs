//! Error types shared by every domain operation.

use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Failure taxonomy for the Event Q&A domain.
///
/// Each variant carries the human-readable message that ends up in the
/// response body. The web layer maps variants onto HTTP status codes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ═══════════════════════════════════════════════════════════
    // Caller Errors
    // ═══════════════════════════════════════════════════════════

    /// The resource does not exist or is hidden from the caller.
    #[error("{0}")]
    NotFound(String),

    /// The caller is known but lacks the required role.
    #[error("{0}")]
    Forbidden(String),

    /// No usable credential was presented.
    #[error("{0}")]
    Unauthorized(String),

    /// The request collides with existing state.
    #[error("{0}")]
    Conflict(String),

    /// The request is well-formed but violates a domain rule.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // Collaborator Errors
    // ═══════════════════════════════════════════════════════════

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The mail collaborator failed.
    #[error("Notification error: {0}")]
    Notification(String),
}

impl DomainError {
    /// Create a `NotFound` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a `Forbidden` error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create an `Unauthorized` error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a `Conflict` error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a `Validation` error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a `Storage` error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a `Notification` error.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification(message.into())
    }

    /// Whether the error was caused by a collaborator rather than the caller.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Notification(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_display_their_message_verbatim() {
        let error = DomainError::forbidden("Only hosts can publish questions");
        assert_eq!(error.to_string(), "Only hosts can publish questions");
        assert!(!error.is_internal());
    }

    #[test]
    fn collaborator_errors_are_internal() {
        let error = DomainError::storage("connection reset");
        assert_eq!(error.to_string(), "Storage error: connection reset");
        assert!(error.is_internal());
    }
}
