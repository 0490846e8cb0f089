//! Core error type.

use thiserror::Error;

use crate::domain::users::fields::FieldErrors;

/// Errors raised by the domain, policy and persistence layers.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed JSON input.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input rejected by the field declaration.
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// The record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage or hashing failure; details are not for clients.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias over [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
