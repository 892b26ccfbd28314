//! Simulated support chat.

use super::report_write;
use crate::error::{Result, StorefrontError};
use crate::models::ChatMessage;
use crate::state::AppState;
use crate::store::{KeyValueStorage, PersistedStore, StorageKey};

/// Shown when the chat history is empty.
pub const WELCOME_MESSAGE: &str = "Hello! How can we help?";

/// Canned reply appended after every user message.
pub const SUPPORT_REPLY: &str = "Thanks for your message! We will get back to you soon.";

/// Support chat with a canned responder.
pub struct ChatService<'a, S> {
    state: &'a mut AppState,
    store: &'a PersistedStore<S>,
}

impl<'a, S: KeyValueStorage> ChatService<'a, S> {
    #[must_use]
    pub const fn new(state: &'a mut AppState, store: &'a PersistedStore<S>) -> Self {
        Self { state, store }
    }

    /// Append `text` from the shopper followed by the support reply.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if `text` is blank.
    pub fn send(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StorefrontError::validation("Enter a message"));
        }
        self.state.chat.push(ChatMessage::from_user(text));
        self.state.chat.push(ChatMessage::from_support(SUPPORT_REPLY));
        let result = self.store.save(StorageKey::ChatHistory, &self.state.chat);
        report_write(self.state, StorageKey::ChatHistory, result);
        Ok(())
    }
}

/// Messages to display: the history, or the welcome message if there is none.
#[must_use]
pub fn transcript(history: &[ChatMessage]) -> Vec<ChatMessage> {
    if history.is_empty() {
        vec![ChatMessage::from_support(WELCOME_MESSAGE)]
    } else {
        history.to_vec()
    }
}
