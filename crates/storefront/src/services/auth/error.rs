//! Authentication error types.

use thiserror::Error;

use crate::store::StorageError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] kv_market_core::EmailError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Display name missing.
    #[error("name is required")]
    MissingName,

    /// The API refused the request.
    #[error("request rejected by the API (HTTP {status})")]
    Rejected { status: u16 },

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The local user directory could not be saved.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
