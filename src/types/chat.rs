//! Chat message and request types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::providers::oci::OciParams;

/// Message role
///
/// Roles outside the known set are kept verbatim in [`MessageRole::Other`]
/// so callers can forward message kinds this crate has no mapping for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Developer,
    Tool,
    Other(String),
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Developer => "developer",
            Self::Tool => "tool",
            Self::Other(role) => role,
        }
    }
}

impl From<&str> for MessageRole {
    fn from(role: &str) -> Self {
        match role.to_ascii_lowercase().as_str() {
            "system" => Self::System,
            "user" | "human" => Self::User,
            "assistant" | "ai" => Self::Assistant,
            "developer" => Self::Developer,
            "tool" => Self::Tool,
            _ => Self::Other(role.to_string()),
        }
    }
}

impl From<String> for MessageRole {
    fn from(role: String) -> Self {
        Self::from(role.as_str())
    }
}

impl From<MessageRole> for String {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat message
///
/// # Examples
///
/// ```rust
/// use siumai_provider_oci::types::ChatMessage;
///
/// let history = vec![
///     ChatMessage::system("You are terse."),
///     ChatMessage::user("Hello!"),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<MessageRole>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Creates a user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates a system message
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates an assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Text content of the message.
    pub fn content_text(&self) -> &str {
        &self.content
    }
}

/// A full chat request.
///
/// `params` replaces the client's generation options for this call only;
/// `timeout` bounds the whole request including connection setup.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub params: Option<OciParams>,
    pub timeout: Option<Duration>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: OciParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl From<Vec<ChatMessage>> for ChatRequest {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::new(messages)
    }
}
