//! Error types for the bookstore data layer
//!
//! Every store operation returns a [`StoreResult`]. The variants map onto the
//! error kinds callers are expected to branch on (not found, blocked delete,
//! stock shortage, bad input, cancelled request) plus the persistence failures
//! that can surface from snapshot and report files.

use thiserror::Error;

/// Result type alias using StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Unified error type for store, report and snapshot operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Lookup / integrity errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("not enough stock for book {book_id}: requested {requested}, available {available}")]
    InsufficientStock {
        book_id: u64,
        requested: u64,
        available: u32,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -------------------------------------------------------------------------
    // Request lifecycle
    // -------------------------------------------------------------------------
    #[error("request cancelled")]
    Cancelled,

    // -------------------------------------------------------------------------
    // Persistence errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// `<Kind> with ID <id> not found`
    pub fn not_found(kind: &str, id: u64) -> Self {
        StoreError::NotFound(format!("{} with ID {} not found", kind, id))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        StoreError::InvalidInput(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        StoreError::Conflict(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, StoreError::InsufficientStock { .. })
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, StoreError::InvalidInput(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::not_found("Book", 7);
        assert_eq!(err.to_string(), "Book with ID 7 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = StoreError::InsufficientStock {
            book_id: 1,
            requested: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "not enough stock for book 1: requested 3, available 2"
        );
        assert!(err.is_insufficient_stock());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
