//! Domain errors for the nudge engine.

use thiserror::Error;

/// Domain-level errors that can occur in the nudge engine.
///
/// Unknown task ids are deliberately absent: completion and deletion of an
/// id that is not present are no-ops reported through their outcome types.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Notification failed: {0}")]
    NotificationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::PersistenceUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::PersistenceUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::NotificationFailed(err.to_string())
    }
}
