//! Unified error handling.
//!
//! Provides a unified `StorefrontError` type for every engine operation. No
//! error is fatal to the session: each one blocks only the action that raised
//! it and is reported to the shopper as a [`Notice`].

use thiserror::Error;

use kv_market_core::CatalogKind;

use crate::catalog::FetchError;
use crate::notice::Notice;
use crate::services::auth::AuthError;
use crate::store::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Missing or invalid user input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced catalog item does not exist.
    #[error("Not found: {kind} {id}")]
    NotFound { kind: CatalogKind, id: String },

    /// The action requires a signed-in user.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Catalog API call failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Persisting state failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Account operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// A view fragment could not be rendered.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),
}

impl StorefrontError {
    /// User-facing notice for this error.
    ///
    /// Internal details of fetch, storage and render failures are not exposed.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(message) => Notice::error(message.clone()),
            Self::NotFound { .. } => Notice::warning("This item is no longer available"),
            Self::Unauthorized(message) => Notice::warning(message.clone()),
            Self::Fetch(_) => Notice::warning("The server is unavailable, please try again later"),
            Self::Storage(_) => Notice::error("Could not save your changes"),
            Self::Render(_) => Notice::error("Something went wrong while updating the page"),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => Notice::error("Invalid email or password"),
                AuthError::UserAlreadyExists => {
                    Notice::error("An account with this email already exists")
                }
                AuthError::WeakPassword(message) => Notice::error(message.clone()),
                AuthError::InvalidEmail(_) => Notice::error("Invalid email address"),
                AuthError::MissingName => Notice::error("Enter your name"),
                AuthError::Rejected { .. } => Notice::error("The server rejected the request"),
                AuthError::PasswordHash | AuthError::Storage(_) => {
                    Notice::error("Authentication error")
                }
            },
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::NotFound {
            kind: CatalogKind::Market,
            id: "m9".to_string(),
        };
        assert_eq!(err.to_string(), "Not found: market m9");

        let err = StorefrontError::validation("Enter your name and email");
        assert_eq!(err.to_string(), "Validation error: Enter your name and email");
    }

    #[test]
    fn test_validation_notice_carries_message() {
        let notice = StorefrontError::validation("Enter payment details").notice();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Enter payment details");
    }

    #[test]
    fn test_fetch_notice_hides_details() {
        let notice = StorefrontError::Fetch(FetchError::Network("dns failure at 10.0.0.1".into()))
            .notice();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(!notice.message.contains("10.0.0.1"));
    }

    #[test]
    fn test_auth_notices() {
        let notice = StorefrontError::from(AuthError::InvalidCredentials).notice();
        assert_eq!(notice.message, "Invalid email or password");

        let notice = StorefrontError::from(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ))
        .notice();
        assert_eq!(notice.message, "Password must be at least 8 characters");
    }
}
