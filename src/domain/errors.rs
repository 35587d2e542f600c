//! Domain error types
//!
//! Only `Storage` ever reaches the interactive session; a book no catalog knows
//! is an outcome, not an error. Catalog transport failures are flattened to
//! "no result" at the provider boundary.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Input looked like an ISBN but failed its check digit
    InvalidIdentifier(String),
    /// Catalog service error (network, HTTP status, payload)
    External(String),
    /// Persisted table unreadable or unwritable
    Storage(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    /// Storage failures end the session: the table can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::Storage(_) | DomainError::Internal(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::InvalidIdentifier(raw) => write!(f, "Invalid identifier: {}", raw),
            DomainError::External(msg) => write!(f, "External service error: {}", msg),
            DomainError::Storage(msg) => write!(f, "Storage error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

impl From<csv::Error> for DomainError {
    fn from(e: csv::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}
