//! Domain error types.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Expected business-rule failures carry a client-safe message. Only
/// `Storage` is unexpected.
///
/// Ownership failures on gigs and applications come back as `NotFound` so a
/// non-owner cannot tell whether the row exists. Messaging permission
/// failures are `Forbidden`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}
