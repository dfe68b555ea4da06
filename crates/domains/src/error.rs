//! # BoardError
//!
//! Centralized error handling for the Agora ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Resource not found (e.g., Article, Comment, UserAccount)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Validation failure (e.g., comment too long, parent comment from
    /// another article)
    #[error("validation error: {0}")]
    Validation(String),

    /// Security/Auth failure (bad credentials, not the owner)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (DB down, OAuth endpoint unreachable)
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// A specialized Result type for board logic.
pub type Result<T> = std::result::Result<T, BoardError>;
