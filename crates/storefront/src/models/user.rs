//! User domain types.
//!
//! The signed-in user is a display and gating flag only (for example,
//! publishing a listing requires one). It is not a security credential.

use serde::{Deserialize, Serialize};

use kv_market_core::UserId;

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Remote user id; `None` for accounts known only to the local directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An account in the local registered-user directory.
///
/// Used when the catalog API is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub name: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

impl From<&RegisteredUser> for User {
    fn from(registered: &RegisteredUser) -> Self {
        Self {
            id: None,
            name: registered.name.clone(),
            email: Some(registered.email.clone()),
        }
    }
}
