//! Support chat messages.

use serde::{Deserialize, Serialize};

use kv_market_core::ChatAuthor;

/// One message in the support chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: ChatAuthor,
    pub text: String,
}

impl ChatMessage {
    #[must_use]
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            author: ChatAuthor::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn from_support(text: impl Into<String>) -> Self {
        Self {
            author: ChatAuthor::Support,
            text: text.into(),
        }
    }
}
