//! In-memory chat transcript.
//!
//! Append-only, reset on demand, never persisted.

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Set on assistant notices that ask the user to sign in.
    pub requires_auth: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            requires_auth: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            requires_auth: false,
        }
    }

    /// Assistant notice telling the user the question needs authentication.
    pub fn auth_notice(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            requires_auth: true,
        }
    }
}

/// Ordered, append-only message sequence for one chat session.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Clears the transcript. The owned-state reset handle.
    pub fn reset(&mut self) {
        self.messages.clear();
    }
}
